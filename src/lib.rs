//! Neon Run - a top-down arena extraction game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (movement, combat, progression, run state)
//! - `config`: Data-driven world and balance configuration
//! - `persistence`: Cross-run progression record and its stores
//! - `error`: Configuration, transition and record errors

pub mod config;
pub mod error;
pub mod persistence;
pub mod sim;

pub use config::{ContactDamage, Difficulty, HostileNavigation, SimConfig};
pub use error::{ConfigError, PhaseError, RecordError, ShopError};
pub use persistence::{ProgressionRecord, ProgressionStore};
pub use sim::{Simulation, TickInput, TickOutcome};

use glam::Vec2;

/// Fixed tuning constants.
///
/// Movement and projectile speeds are expressed in world units per tick, not
/// per second: motion is frame-rate dependent while timers and cooldowns use
/// elapsed seconds.
pub mod consts {
    /// Largest frame delta the driver will simulate (seconds)
    pub const MAX_TICK_DT: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 22.0;
    pub const PLAYER_SPEED: f32 = 7.5;
    pub const PLAYER_BASE_HEALTH: f32 = 100.0;
    pub const PLAYER_START_AMMO: u32 = 60;

    /// Hostile defaults
    pub const HOSTILE_RADIUS: f32 = 25.0;
    pub const HOSTILE_HEALTH: f32 = 10.0;
    pub const HOSTILE_SPEED: f32 = 2.4;
    /// Health drained from the player per overlapping hostile per tick
    pub const CONTACT_DAMAGE: f32 = 1.0;
    /// Re-hit window for the debounced contact policy (seconds)
    pub const CONTACT_DEBOUNCE: f32 = 0.5;
    /// Damage of one debounced hit
    pub const CONTACT_HIT_DAMAGE: f32 = 10.0;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 18.0;
    pub const PROJECTILE_RADIUS: f32 = 6.0;
    pub const SPECIAL_PROJECTILE_RADIUS: f32 = 10.0;
    /// Distance outside the world a projectile may travel before removal
    pub const PROJECTILE_BOUND_MARGIN: f32 = 200.0;

    /// Loot
    pub const LOOT_RADIUS: f32 = 10.0;
    pub const AMMO_PER_PICKUP: u32 = 25;
    pub const XP_PER_PICKUP: f32 = 40.0;

    /// Chests
    pub const CHEST_RADIUS: f32 = 35.0;
    pub const CHEST_OPEN_RANGE: f32 = 100.0;
    pub const CHEST_OPEN_TIME: f32 = 5.0;
    pub const CHEST_CURRENCY_DROPS: usize = 8;
    pub const CHEST_AMMO_DROPS: usize = 3;
    pub const CHEST_SCATTER: f32 = 50.0;

    /// Screen shake magnitudes and per-tick decay
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const SHAKE_CONTACT: f32 = 10.0;
    pub const SHAKE_LASER: f32 = 4.0;
    pub const SHAKE_CHEST: f32 = 20.0;

    /// Particles
    pub const PARTICLE_SPEED: f32 = 12.0;
    pub const PARTICLE_LIFE: f32 = 1.0;
    pub const MAX_PARTICLES: usize = 512;
}

/// Unit heading vector for an angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the ray from `from` toward `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
