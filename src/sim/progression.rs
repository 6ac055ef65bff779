//! Experience, level-ups and abilities
//!
//! Experience carries its remainder across a level-up. Every level-up offers a
//! random sample of the catalog; the chosen ability is applied exactly once.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Player;
use crate::error::ConfigError;

/// Ability identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityId {
    RapidFire,
    HardenedRounds,
    TacticalArmor,
    SwiftStep,
    Scavenger,
    NovaBurst,
    Lance,
    Regeneration,
    ShockPulse,
}

impl AbilityId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityId::RapidFire => "rapid_fire",
            AbilityId::HardenedRounds => "hardened_rounds",
            AbilityId::TacticalArmor => "tactical_armor",
            AbilityId::SwiftStep => "swift_step",
            AbilityId::Scavenger => "scavenger",
            AbilityId::NovaBurst => "nova_burst",
            AbilityId::Lance => "lance",
            AbilityId::Regeneration => "regeneration",
            AbilityId::ShockPulse => "shock_pulse",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rapid_fire" => Some(AbilityId::RapidFire),
            "hardened_rounds" => Some(AbilityId::HardenedRounds),
            "tactical_armor" => Some(AbilityId::TacticalArmor),
            "swift_step" => Some(AbilityId::SwiftStep),
            "scavenger" => Some(AbilityId::Scavenger),
            "nova_burst" => Some(AbilityId::NovaBurst),
            "lance" => Some(AbilityId::Lance),
            "regeneration" => Some(AbilityId::Regeneration),
            "shock_pulse" => Some(AbilityId::ShockPulse),
            _ => None,
        }
    }
}

/// Broad ability category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Permanent stat change applied on selection
    Passive,
    /// Special attack on the dedicated trigger
    Weapon,
    /// Recurring timed effect
    Skill,
}

/// Special attacks granted by weapon abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Ring of projectiles around the player
    Nova,
    /// One heavy piercing bolt along the aim
    Lance,
}

impl SpecialKind {
    pub fn base_damage(&self) -> f32 {
        match self {
            SpecialKind::Nova => 6.0,
            SpecialKind::Lance => 30.0,
        }
    }

    /// Seconds between uses
    pub fn cooldown(&self) -> f32 {
        match self {
            SpecialKind::Nova => 4.0,
            SpecialKind::Lance => 2.5,
        }
    }

    pub fn projectile_count(&self) -> u32 {
        match self {
            SpecialKind::Nova => 12,
            SpecialKind::Lance => 1,
        }
    }

    pub fn pierce(&self) -> u32 {
        match self {
            SpecialKind::Nova => 0,
            SpecialKind::Lance => 8,
        }
    }
}

/// Recurring skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Heal 4 per level
    Regeneration,
    /// Damage 5 per level to every hostile in range
    ShockPulse,
}

impl SkillKind {
    /// Seconds between triggers
    pub fn interval(&self) -> f32 {
        match self {
            SkillKind::Regeneration => 2.0,
            SkillKind::ShockPulse => 3.0,
        }
    }
}

/// Pulse reach from the player centre
pub const SHOCK_PULSE_RADIUS: f32 = 160.0;

/// Effect applied when an ability is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    FireIntervalMult(f32),
    DamageMult(f32),
    Armor { max_health: f32, heal: f32 },
    SpeedMult(f32),
    PickupRadiusMult(f32),
    Special(SpecialKind),
    Skill(SkillKind),
}

impl AbilityEffect {
    pub fn kind(&self) -> AbilityKind {
        match self {
            AbilityEffect::Special(_) => AbilityKind::Weapon,
            AbilityEffect::Skill(_) => AbilityKind::Skill,
            _ => AbilityKind::Passive,
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: &'static str,
    pub effect: AbilityEffect,
}

impl AbilityDef {
    pub fn kind(&self) -> AbilityKind {
        self.effect.kind()
    }
}

/// Weapon ability in the player's kit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialAttack {
    pub kind: SpecialKind,
    pub level: u32,
    /// Run clock time of the last use
    pub last_used: Option<f32>,
}

impl SpecialAttack {
    /// Each extra level adds 25% damage
    pub fn damage(&self) -> f32 {
        self.kind.base_damage() * 1.25f32.powi(self.level.saturating_sub(1) as i32)
    }

    pub fn ready(&self, now: f32) -> bool {
        self.last_used
            .is_none_or(|t| now - t >= self.kind.cooldown())
    }
}

/// Skill in the player's kit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSkill {
    pub kind: SkillKind,
    pub level: u32,
    /// Seconds since the last trigger
    pub elapsed: f32,
}

/// The fixed set of abilities a level-up can offer
#[derive(Debug, Clone)]
pub struct AbilityCatalog {
    entries: Vec<AbilityDef>,
}

impl AbilityCatalog {
    /// Catalog must hold at least one ability
    pub fn new(entries: Vec<AbilityDef>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self { entries })
    }

    /// The shipped catalog
    pub fn standard() -> Self {
        use AbilityEffect::*;
        let entries = vec![
            AbilityDef {
                id: AbilityId::RapidFire,
                name: "Rapid Fire",
                effect: FireIntervalMult(0.8),
            },
            AbilityDef {
                id: AbilityId::HardenedRounds,
                name: "Hardened Rounds",
                effect: DamageMult(1.3),
            },
            AbilityDef {
                id: AbilityId::TacticalArmor,
                name: "Tactical Armor",
                effect: Armor {
                    max_health: 25.0,
                    heal: 25.0,
                },
            },
            AbilityDef {
                id: AbilityId::SwiftStep,
                name: "Swift Step",
                effect: SpeedMult(1.15),
            },
            AbilityDef {
                id: AbilityId::Scavenger,
                name: "Scavenger",
                effect: PickupRadiusMult(1.5),
            },
            AbilityDef {
                id: AbilityId::NovaBurst,
                name: "Nova Burst",
                effect: Special(SpecialKind::Nova),
            },
            AbilityDef {
                id: AbilityId::Lance,
                name: "Lance",
                effect: Special(SpecialKind::Lance),
            },
            AbilityDef {
                id: AbilityId::Regeneration,
                name: "Regeneration",
                effect: Skill(SkillKind::Regeneration),
            },
            AbilityDef {
                id: AbilityId::ShockPulse,
                name: "Shock Pulse",
                effect: Skill(SkillKind::ShockPulse),
            },
        ];
        Self { entries }
    }

    pub fn get(&self, id: AbilityId) -> Option<&AbilityDef> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn entries(&self) -> &[AbilityDef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw up to `count` distinct abilities
    pub fn draw_offer<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<AbilityId> {
        let amount = count.min(self.entries.len());
        rand::seq::index::sample(rng, self.entries.len(), amount)
            .into_iter()
            .map(|i| self.entries[i].id)
            .collect()
    }
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Add experience; threshold handling happens in `check_level_up`
pub fn gain_xp(player: &mut Player, amount: f32) {
    player.xp += amount;
}

/// One threshold comparison per tick. On crossing, the threshold is
/// subtracted (remainder carries), the level rises and the next threshold
/// grows by `growth`.
pub fn check_level_up(player: &mut Player, growth: f32) -> bool {
    if player.xp < player.next_level_xp {
        return false;
    }
    player.xp -= player.next_level_xp;
    player.level += 1;
    player.next_level_xp *= growth;
    log::debug!(
        "Level {} reached ({} xp carried, next at {})",
        player.level,
        player.xp,
        player.next_level_xp
    );
    true
}

/// Progress toward the next level (0-1)
pub fn xp_ratio(player: &Player) -> f32 {
    (player.xp / player.next_level_xp).clamp(0.0, 1.0)
}

/// Apply an ability to the player. Multiplicative passives compound on repeat.
pub fn apply_ability(player: &mut Player, def: &AbilityDef) {
    match def.effect {
        AbilityEffect::FireIntervalMult(m) => player.fire_interval_mult *= m,
        AbilityEffect::DamageMult(m) => player.damage_mult *= m,
        AbilityEffect::Armor { max_health, heal } => {
            player.max_health += max_health;
            player.heal(heal);
        }
        AbilityEffect::SpeedMult(m) => player.speed_mult *= m,
        AbilityEffect::PickupRadiusMult(m) => player.pickup_radius_mult *= m,
        AbilityEffect::Special(kind) => {
            match player.specials.iter_mut().find(|s| s.kind == kind) {
                Some(special) => special.level += 1,
                None => player.specials.push(SpecialAttack {
                    kind,
                    level: 1,
                    last_used: None,
                }),
            }
        }
        AbilityEffect::Skill(kind) => match player.skills.iter_mut().find(|s| s.kind == kind) {
            Some(skill) => skill.level += 1,
            None => player.skills.push(ActiveSkill {
                kind,
                level: 1,
                elapsed: 0.0,
            }),
        },
    }
    log::info!("Ability applied: {} ({:?})", def.name, def.kind());
}
