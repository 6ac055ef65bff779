//! Per-frame simulation core
//!
//! All gameplay logic lives here. This module performs no I/O:
//! - One owned `Simulation` context, advanced by `tick`/`advance`
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Insertion-ordered entity collections
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod combat;
pub mod movement;
pub mod phase;
pub mod pickup;
pub mod progression;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod weapon;
pub mod worldgen;

pub use autopilot::Autopilot;
pub use collision::{Rect, circle_rect_overlap, circles_overlap};
pub use phase::{DeathCause, RunOutcome, RunPhase};
pub use progression::{AbilityCatalog, AbilityDef, AbilityEffect, AbilityId, AbilityKind};
pub use snapshot::{HudView, RenderSnapshot};
pub use state::{
    Chest, ExtractionZone, Hostile, LootItem, LootKind, Obstacle, Particle, Player, Projectile,
    RunState,
};
pub use tick::{Aim, RunSummary, Simulation, TickInput, TickOutcome};
pub use weapon::{ProjectileTag, Weapon, WeaponId};
