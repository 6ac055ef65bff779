//! Simulation configuration
//!
//! World layout, population and balance knobs. Loaded from JSON or built from
//! a difficulty preset; always validated before a simulation is constructed.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Hostile population for this preset
    pub fn hostile_count(&self) -> usize {
        match self {
            Difficulty::Easy => 40,
            Difficulty::Normal => 60,
            Difficulty::Hard => 90,
        }
    }

    /// Probability a hostile spawns as an elite
    pub fn elite_chance(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.05,
            Difficulty::Normal => 0.1,
            Difficulty::Hard => 0.2,
        }
    }

    /// Extraction countdown (seconds)
    pub fn extraction_seconds(&self) -> f32 {
        match self {
            Difficulty::Easy => 90.0,
            Difficulty::Normal => 60.0,
            Difficulty::Hard => 45.0,
        }
    }
}

/// How hostiles pursue the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HostileNavigation {
    /// Straight line toward the player, passing through obstacles
    Direct,
    /// Same axis-separated resolution the player uses
    #[default]
    RespectObstacles,
}

/// How overlapping hostiles hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContactDamage {
    /// A fixed drain every tick of overlap
    #[default]
    Continuous,
    /// One hit per hostile, then a short immunity window
    Debounced,
}

/// World generation and balance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Difficulty this config was derived from
    pub difficulty: Difficulty,

    // === World ===
    /// Side length of the square world
    pub world_size: f32,
    pub obstacle_count: usize,
    pub obstacle_min_size: f32,
    pub obstacle_max_size: f32,
    /// Maximum rejection-sampling draws per placed entity
    pub placement_attempts: u32,

    // === Population ===
    pub hostile_count: usize,
    pub elite_chance: f32,
    pub elite_health_mult: f32,
    pub elite_radius_mult: f32,
    /// No hostile spawns closer than this to the player start
    pub spawn_exclusion: f32,
    pub hostile_navigation: HostileNavigation,
    pub contact_damage: ContactDamage,

    // === Loot ===
    pub loot_count: usize,
    /// Fraction of scattered loot that is currency (rest is ammunition)
    pub currency_share: f32,
    pub chest_count: usize,

    // === Extraction ===
    /// Currency needed before the extraction zone appears
    pub extraction_threshold: u32,
    /// Countdown once the zone appears (seconds)
    pub extraction_seconds: f32,
    pub extraction_radius: f32,
    pub extraction_min_distance: f32,
    /// Zone centre keeps at least this far from the world edge
    pub extraction_margin: f32,
    pub extraction_attempts: u32,

    // === Progression ===
    pub first_level_xp: f32,
    pub xp_growth: f32,
    pub choice_count: usize,

    // === Timing ===
    pub max_tick_dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Normal)
    }
}

impl SimConfig {
    /// Build a config from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,

            world_size: 3000.0,
            obstacle_count: 40,
            obstacle_min_size: 200.0,
            obstacle_max_size: 500.0,
            placement_attempts: 30,

            hostile_count: difficulty.hostile_count(),
            elite_chance: difficulty.elite_chance(),
            elite_health_mult: 3.0,
            elite_radius_mult: 1.4,
            spawn_exclusion: 400.0,
            hostile_navigation: HostileNavigation::RespectObstacles,
            contact_damage: ContactDamage::Continuous,

            loot_count: 120,
            currency_share: 0.7,
            chest_count: 6,

            extraction_threshold: 5,
            extraction_seconds: difficulty.extraction_seconds(),
            extraction_radius: 130.0,
            extraction_min_distance: 1300.0,
            extraction_margin: 500.0,
            extraction_attempts: 20,

            first_level_xp: 100.0,
            xp_growth: 1.5,
            choice_count: 3,

            max_tick_dt: crate::consts::MAX_TICK_DT,
        }
    }

    /// Parse and validate a JSON config. Missing fields take Normal defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// World centre, where the player spawns
    pub fn world_center(&self) -> glam::Vec2 {
        glam::Vec2::splat(self.world_size / 2.0)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_size > 0.0) {
            return Err(ConfigError::NonPositiveWorld(self.world_size));
        }
        if !(self.obstacle_min_size > 0.0) {
            return Err(ConfigError::NonPositive { field: "obstacle_min_size" });
        }
        if self.obstacle_max_size < self.obstacle_min_size {
            return Err(ConfigError::EmptyObstacleRange {
                min: self.obstacle_min_size,
                max: self.obstacle_max_size,
            });
        }
        if self.obstacle_count > 0 && self.obstacle_max_size >= self.world_size {
            return Err(ConfigError::ObstacleTooLarge {
                size: self.obstacle_max_size,
                world: self.world_size,
            });
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::NonPositive { field: "placement_attempts" });
        }
        if self.extraction_attempts == 0 {
            return Err(ConfigError::NonPositive { field: "extraction_attempts" });
        }
        for (field, value) in [
            ("elite_chance", self.elite_chance),
            ("currency_share", self.currency_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }
        for (field, value) in [
            ("elite_health_mult", self.elite_health_mult),
            ("elite_radius_mult", self.elite_radius_mult),
            ("extraction_seconds", self.extraction_seconds),
            ("extraction_radius", self.extraction_radius),
            ("first_level_xp", self.first_level_xp),
            ("max_tick_dt", self.max_tick_dt),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if !(0.0..self.world_size / 2.0).contains(&self.spawn_exclusion) {
            return Err(ConfigError::SpawnExclusionTooLarge {
                radius: self.spawn_exclusion,
                world: self.world_size,
            });
        }
        if self.extraction_threshold == 0 {
            return Err(ConfigError::NonPositive { field: "extraction_threshold" });
        }
        for (field, value) in [
            ("extraction_margin", self.extraction_margin),
            ("extraction_min_distance", self.extraction_min_distance),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if self.extraction_margin * 2.0 >= self.world_size {
            return Err(ConfigError::ExtractionMarginTooLarge {
                margin: self.extraction_margin,
                world: self.world_size,
            });
        }
        if !(self.xp_growth > 1.0) {
            return Err(ConfigError::GrowthTooSmall(self.xp_growth));
        }
        if self.choice_count == 0 {
            return Err(ConfigError::NoChoices);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert!(SimConfig::from_difficulty(d).validate().is_ok());
        }
    }

    #[test]
    fn test_non_positive_world_rejected() {
        let config = SimConfig {
            world_size: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveWorld(0.0)));

        let config = SimConfig {
            world_size: -10.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NonPositiveWorld(_))));
    }

    #[test]
    fn test_negative_extraction_placement_rejected() {
        let config = SimConfig {
            extraction_margin: -2000.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "extraction_margin",
                value: -2000.0
            })
        );

        let config = SimConfig {
            extraction_min_distance: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "extraction_min_distance",
                ..
            })
        ));

        let config = SimConfig {
            obstacle_min_size: -40.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "obstacle_min_size"
            })
        );
    }

    #[test]
    fn test_bad_probability_rejected() {
        let config = SimConfig {
            elite_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { field: "elite_chance", .. })
        ));
    }

    #[test]
    fn test_growth_and_choices_rejected() {
        let config = SimConfig {
            xp_growth: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::GrowthTooSmall(1.0)));

        let config = SimConfig {
            choice_count: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoChoices));
    }

    #[test]
    fn test_spawn_exclusion_must_fit() {
        let config = SimConfig {
            spawn_exclusion: 2000.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SpawnExclusionTooLarge {
                radius: 2000.0,
                world: 3000.0
            })
        );
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SimConfig::from_json(r#"{ "world_size": 2000.0, "hostile_count": 5 }"#)
            .expect("valid config");
        assert_eq!(config.world_size, 2000.0);
        assert_eq!(config.hostile_count, 5);
        assert_eq!(config.extraction_threshold, 5);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(SimConfig::from_json("not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            SimConfig::from_json(r#"{ "world_size": -1.0 }"#),
            Err(ConfigError::NonPositiveWorld(_))
        ));
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("norm"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::Easy.as_str(), "Easy");
    }
}
