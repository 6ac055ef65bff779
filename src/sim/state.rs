//! Run state and entity types
//!
//! A `RunState` owns every mutable collection for one run and hands out
//! entity ids from a single monotonically increasing counter.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::phase::RunPhase;
use super::progression::{ActiveSkill, SpecialAttack};
use super::weapon::{ProjectileTag, Weapon, WeaponId};
use crate::consts::*;
use crate::persistence::Upgrades;

/// Static obstacles are plain rectangles
pub type Obstacle = Rect;

/// The controllable actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Facing angle (radians), follows the aim
    pub angle: f32,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// Currency collected this run
    pub currency: u32,
    pub ammo: u32,
    pub xp: f32,
    pub next_level_xp: f32,
    pub level: u32,
    /// Weapons equipped for this run, cycled with the weapon-cycle trigger
    pub loadout: Vec<WeaponId>,
    pub weapon_index: usize,
    /// Chest reward overriding the loadout
    pub special_weapon: Option<Weapon>,
    /// Run clock time of the last volley
    pub last_shot: Option<f32>,
    pub damage_mult: f32,
    /// Multiplier on every weapon's fire interval (lower fires faster)
    pub fire_interval_mult: f32,
    pub speed_mult: f32,
    pub pickup_radius_mult: f32,
    /// Persistent damage bonus from purchased upgrades
    pub upgrade_damage_mult: f32,
    /// Weapon abilities, fired on the special trigger
    pub specials: Vec<SpecialAttack>,
    /// Recurring timed effects
    pub skills: Vec<ActiveSkill>,
}

impl Player {
    /// Fresh player at `pos`, with purchased upgrades folded into base stats
    pub fn new(
        pos: Vec2,
        loadout: Vec<WeaponId>,
        upgrades: &Upgrades,
        first_level_xp: f32,
    ) -> Self {
        let max_health = PLAYER_BASE_HEALTH + 10.0 * upgrades.vitality as f32;
        let loadout = if loadout.is_empty() {
            vec![WeaponId::BASELINE]
        } else {
            loadout
        };
        Self {
            pos,
            angle: 0.0,
            radius: PLAYER_RADIUS,
            health: max_health,
            max_health,
            currency: 0,
            ammo: PLAYER_START_AMMO,
            xp: 0.0,
            next_level_xp: first_level_xp,
            level: 1,
            loadout,
            weapon_index: 0,
            special_weapon: None,
            last_shot: None,
            damage_mult: 1.0,
            fire_interval_mult: 1.0,
            speed_mult: 1.0 + 0.05 * upgrades.mobility as f32,
            pickup_radius_mult: 1.0,
            upgrade_damage_mult: 1.0 + 0.1 * upgrades.firepower as f32,
            specials: Vec::new(),
            skills: Vec::new(),
        }
    }

    /// Weapon that fires on the next volley
    pub fn active_weapon(&self) -> Weapon {
        if let Some(special) = self.special_weapon {
            return special;
        }
        self.loadout
            .get(self.weapon_index)
            .copied()
            .unwrap_or(WeaponId::BASELINE)
            .weapon()
    }

    /// Advance to the next equipped weapon (wrapping)
    pub fn cycle_weapon(&mut self) {
        if self.loadout.len() > 1 {
            self.weapon_index = (self.weapon_index + 1) % self.loadout.len();
        }
    }

    /// Multiplier applied to every outgoing hit
    pub fn total_damage_mult(&self) -> f32 {
        self.damage_mult * self.upgrade_damage_mult
    }

    pub fn speed(&self) -> f32 {
        PLAYER_SPEED * self.speed_mult
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// A hostile chasing the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub elite: bool,
    /// Run clock time of the last debounced contact hit
    #[serde(default)]
    pub last_contact: Option<f32>,
}

impl Hostile {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            radius: HOSTILE_RADIUS,
            health: HOSTILE_HEALTH,
            max_health: HOSTILE_HEALTH,
            elite: false,
            last_contact: None,
        }
    }

    /// Promote to elite: more health, larger body
    pub fn into_elite(mut self, health_mult: f32, radius_mult: f32) -> Self {
        self.elite = true;
        self.max_health *= health_mult;
        self.health = self.max_health;
        self.radius *= radius_mult;
        self
    }

    /// Apply damage; health never rises and never exceeds max
    pub fn take_damage(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health -= amount;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_ratio(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// World units per tick
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Extra hostiles this projectile may still pass through
    pub pierce: u32,
    pub tag: ProjectileTag,
    /// Hostiles already struck; a piercing shot damages each one once
    #[serde(default)]
    pub hit_ids: Vec<u32>,
}

/// Loot types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    Currency,
    Ammo,
    Experience,
}

/// A pickup lying in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootItem {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub kind: LootKind,
}

/// A chest opened by standing still next to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chest {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub opened: bool,
    /// Seconds of uninterrupted standing so far
    pub progress: f32,
}

/// The goal region plus its countdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionZone {
    pub pos: Vec2,
    pub radius: f32,
    /// Seconds left to reach the zone
    pub remaining: f32,
}

/// Colour lookup key for particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTint {
    Projectile(ProjectileTag),
    Hostile,
    Chest,
    Pulse,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub tint: EffectTint,
    /// 0-1, decreases by dt
    pub life: f32,
    pub size: f32,
}

/// Everything mutable for one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub seed: u64,
    pub phase: RunPhase,
    pub player: Player,
    /// Insertion-ordered; combat iterates in this order
    pub hostiles: Vec<Hostile>,
    pub projectiles: Vec<Projectile>,
    pub loot: Vec<LootItem>,
    pub obstacles: Vec<Obstacle>,
    pub chests: Vec<Chest>,
    pub particles: Vec<Particle>,
    /// Appears once, the tick currency first reaches the threshold
    pub extraction: Option<ExtractionZone>,
    /// Seconds of simulated time this run
    pub clock: f32,
    pub ticks: u64,
    pub screen_shake: f32,
    pub hostiles_defeated: u32,
    /// Gameplay randomness
    pub rng: Pcg32,
    /// Cosmetic randomness (particles, shake); never touches gameplay
    pub fx_rng: Pcg32,
    next_id: u32,
}

impl RunState {
    /// Empty registry in the preparing phase
    pub fn new(seed: u64, player: Player) -> Self {
        Self {
            seed,
            phase: RunPhase::Preparing,
            player,
            hostiles: Vec::new(),
            projectiles: Vec::new(),
            loot: Vec::new(),
            obstacles: Vec::new(),
            chests: Vec::new(),
            particles: Vec::new(),
            extraction: None,
            clock: 0.0,
            ticks: 0,
            screen_shake: 0.0,
            hostiles_defeated: 0,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_loot(&mut self, pos: Vec2, kind: LootKind) -> u32 {
        let id = self.next_entity_id();
        self.loot.push(LootItem {
            id,
            pos,
            radius: LOOT_RADIUS,
            kind,
        });
        id
    }

    pub fn spawn_projectile(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        damage: f32,
        pierce: u32,
        tag: ProjectileTag,
    ) -> u32 {
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos,
            vel,
            radius,
            damage,
            pierce,
            tag,
            hit_ids: Vec::new(),
        });
        id
    }

    /// Raise shake to at least `magnitude`
    pub fn shake(&mut self, magnitude: f32) {
        self.screen_shake = self.screen_shake.max(magnitude);
    }

    /// Currency threshold has been met (zone and countdown exist)
    pub fn extraction_open(&self) -> bool {
        self.extraction.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::splat(100.0), vec![], &Upgrades::default(), 100.0)
    }

    #[test]
    fn test_entity_ids_are_monotonic() {
        let mut state = RunState::new(7, player());
        let a = state.next_entity_id();
        let b = state.spawn_loot(Vec2::ZERO, LootKind::Ammo);
        let c = state.next_entity_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_empty_loadout_falls_back_to_baseline() {
        let p = player();
        assert_eq!(p.loadout, vec![WeaponId::Standard]);
        assert_eq!(p.active_weapon(), WeaponId::Standard.weapon());
    }

    #[test]
    fn test_upgrades_seed_player_stats() {
        let upgrades = Upgrades {
            vitality: 2,
            firepower: 3,
            mobility: 1,
        };
        let p = Player::new(Vec2::ZERO, vec![WeaponId::Sniper], &upgrades, 100.0);
        assert_eq!(p.max_health, 120.0);
        assert_eq!(p.health, 120.0);
        assert!((p.upgrade_damage_mult - 1.3).abs() < 1e-5);
        assert!((p.speed() - PLAYER_SPEED * 1.05).abs() < 1e-5);
    }

    #[test]
    fn test_cycle_weapon_wraps() {
        let mut p = Player::new(
            Vec2::ZERO,
            vec![WeaponId::Standard, WeaponId::Shotgun],
            &Upgrades::default(),
            100.0,
        );
        p.cycle_weapon();
        assert_eq!(p.active_weapon().tag(), ProjectileTag::Shotgun);
        p.cycle_weapon();
        assert_eq!(p.active_weapon().tag(), ProjectileTag::Standard);
    }

    #[test]
    fn test_special_weapon_overrides_loadout() {
        let mut p = player();
        p.special_weapon = Some(Weapon::laser());
        assert!(p.active_weapon().is_special());
    }

    #[test]
    fn test_elite_promotion() {
        let h = Hostile::new(1, Vec2::ZERO).into_elite(3.0, 1.4);
        assert!(h.elite);
        assert_eq!(h.health, h.max_health);
        assert_eq!(h.max_health, HOSTILE_HEALTH * 3.0);
        assert!((h.radius - HOSTILE_RADIUS * 1.4).abs() < 1e-5);
    }

    #[test]
    fn test_hostile_damage_never_heals() {
        let mut h = Hostile::new(1, Vec2::ZERO);
        h.take_damage(-5.0);
        assert_eq!(h.health, HOSTILE_HEALTH);
        h.take_damage(4.0);
        assert_eq!(h.health, HOSTILE_HEALTH - 4.0);
    }
}
