//! Error taxonomy
//!
//! The simulation loop itself has no failure surface: placement exhaustion and
//! unknown identifiers are absorbed with a log line. Errors only exist at the
//! edges, when a configuration is built, when the host requests a run-state
//! transition, or when a persisted record is decoded.

use crate::persistence::UpgradeKind;
use crate::sim::{AbilityId, RunPhase, WeaponId};

/// Invalid simulation configuration. Not recoverable mid-run.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("world size must be positive, got {0}")]
    NonPositiveWorld(f32),

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f32 },

    #[error("obstacle size range is empty ({min}..{max})")]
    EmptyObstacleRange { min: f32, max: f32 },

    #[error("obstacles of size {size} do not fit in a world of size {world}")]
    ObstacleTooLarge { size: f32, world: f32 },

    #[error("spawn exclusion {radius} leaves no room in a world of size {world}")]
    SpawnExclusionTooLarge { radius: f32, world: f32 },

    #[error("experience growth factor must exceed 1, got {0}")]
    GrowthTooSmall(f32),

    #[error("ability catalog is empty")]
    EmptyCatalog,

    #[error("level-up choice count must be at least 1")]
    NoChoices,

    #[error("extraction margin {margin} leaves no room in a world of size {world}")]
    ExtractionMarginTooLarge { margin: f32, world: f32 },

    #[error("invalid configuration JSON: {0}")]
    Parse(String),
}

/// A run-state transition the machine refuses. State is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: RunPhase, to: RunPhase },

    #[error("ability {0:?} was not offered")]
    NotOffered(AbilityId),
}

/// Persisted progression data that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed progression record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("progression record version {found} is newer than supported {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("progression store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A shop or loadout request the record refuses. The record is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("{0:?} is already owned")]
    AlreadyOwned(WeaponId),

    #[error("{0:?} is not owned")]
    NotOwned(WeaponId),

    #[error("costs {price}, only {balance} available")]
    Unaffordable { price: u32, balance: u32 },

    #[error("{0:?} is already at the maximum level")]
    MaxLevel(UpgradeKind),

    #[error("loadout already holds {0} weapons")]
    LoadoutFull(usize),

    #[error("the last equipped weapon cannot be removed")]
    LastEquipped,
}
