//! Run state machine
//!
//! Preparing -> Active <-> PausedLevelUp, Active -> Extracted | Dead.
//! Terminal phases only lead back to Preparing for a new run.

use serde::{Deserialize, Serialize};

use crate::error::PhaseError;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Loadout selection, nothing simulates
    Preparing,
    /// Full tick processing
    Active,
    /// Frozen until an offered ability is chosen
    PausedLevelUp,
    /// Reached the extraction zone in time
    Extracted,
    /// Health depleted or countdown expired
    Dead,
}

impl RunPhase {
    /// Whether `self -> to` is a legal edge
    pub fn can_transition(self, to: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, to),
            (Preparing, Active)
                | (Active, PausedLevelUp)
                | (PausedLevelUp, Active)
                | (Active, Extracted)
                | (Active, Dead)
                | (Extracted, Preparing)
                | (Dead, Preparing)
        )
    }

    /// Validated transition
    pub fn transition(self, to: RunPhase) -> Result<RunPhase, PhaseError> {
        if self.can_transition(to) {
            log::debug!("Run phase {:?} -> {:?}", self, to);
            Ok(to)
        } else {
            Err(PhaseError::InvalidTransition { from: self, to })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Extracted | RunPhase::Dead)
    }

    /// Only the active phase advances the world
    pub fn is_simulating(self) -> bool {
        self == RunPhase::Active
    }
}

/// Why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    HealthDepleted,
    CountdownExpired,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Extracted,
    Dead(DeathCause),
}

#[cfg(test)]
mod tests {
    use super::*;
    use RunPhase::*;

    const ALL: [RunPhase; 5] = [Preparing, Active, PausedLevelUp, Extracted, Dead];

    #[test]
    fn test_transition_table() {
        for from in ALL {
            for to in ALL {
                let expected = match from {
                    Preparing => to == Active,
                    Active => matches!(to, PausedLevelUp | Extracted | Dead),
                    PausedLevelUp => to == Active,
                    Extracted | Dead => to == Preparing,
                };
                assert_eq!(from.can_transition(to), expected, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        assert_eq!(
            Preparing.transition(Dead),
            Err(PhaseError::InvalidTransition {
                from: Preparing,
                to: Dead
            })
        );
        assert_eq!(Active.transition(Dead), Ok(Dead));
    }

    #[test]
    fn test_terminal_and_simulating() {
        assert!(Extracted.is_terminal() && Dead.is_terminal());
        assert!(!PausedLevelUp.is_terminal());
        assert!(Active.is_simulating());
        assert!(!PausedLevelUp.is_simulating());
    }
}
