//! Weapon definitions
//!
//! Each weapon kind carries only the parameters it uses; the shared surface
//! (damage, fire interval, volley shape) is exposed through methods.

use serde::{Deserialize, Serialize};

use crate::consts::{PROJECTILE_RADIUS, SPECIAL_PROJECTILE_RADIUS};

/// Purchasable weapon identifiers, as stored in the progression record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponId {
    Standard,
    Shotgun,
    Sniper,
    Bubble,
}

impl WeaponId {
    pub const ALL: [WeaponId; 4] = [
        WeaponId::Standard,
        WeaponId::Shotgun,
        WeaponId::Sniper,
        WeaponId::Bubble,
    ];

    /// The loadout every player owns and falls back to
    pub const BASELINE: WeaponId = WeaponId::Standard;

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponId::Standard => "standard",
            WeaponId::Shotgun => "shotgun",
            WeaponId::Sniper => "sniper",
            WeaponId::Bubble => "bubble",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(WeaponId::Standard),
            "shotgun" => Some(WeaponId::Shotgun),
            "sniper" => Some(WeaponId::Sniper),
            "bubble" => Some(WeaponId::Bubble),
            _ => None,
        }
    }

    /// Shop price in banked currency
    pub fn price(&self) -> u32 {
        match self {
            WeaponId::Standard => 0,
            WeaponId::Shotgun => 30,
            WeaponId::Bubble => 40,
            WeaponId::Sniper => 50,
        }
    }

    pub fn weapon(&self) -> Weapon {
        match self {
            WeaponId::Standard => Weapon::Pistol {
                damage: 3.0,
                interval: 0.3,
            },
            WeaponId::Shotgun => Weapon::Scatter {
                damage: 2.0,
                interval: 0.8,
                count: 5,
                spread: 0.4,
            },
            WeaponId::Sniper => Weapon::Rail {
                damage: 25.0,
                interval: 1.5,
                pierce: 5,
            },
            WeaponId::Bubble => Weapon::Stream {
                damage: 1.0,
                interval: 0.1,
            },
        }
    }
}

/// Visual/behavioural tag carried by every projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileTag {
    Standard,
    Shotgun,
    Sniper,
    Bubble,
    Laser,
    Nova,
    Lance,
}

/// A weapon kind with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Weapon {
    /// Single shot, moderate rate
    Pistol { damage: f32, interval: f32 },
    /// Several projectiles fanned across `spread` radians
    Scatter {
        damage: f32,
        interval: f32,
        count: u32,
        spread: f32,
    },
    /// Heavy shot that passes through `pierce` extra hostiles
    Rail { damage: f32, interval: f32, pierce: u32 },
    /// Very fast, very weak
    Stream { damage: f32, interval: f32 },
    /// Chest reward; overrides the equipped weapon for the rest of the run
    Laser { damage: f32, interval: f32 },
}

impl Weapon {
    /// The chest reward
    pub fn laser() -> Self {
        Weapon::Laser {
            damage: 40.0,
            interval: 0.06,
        }
    }

    pub fn damage(&self) -> f32 {
        match *self {
            Weapon::Pistol { damage, .. }
            | Weapon::Scatter { damage, .. }
            | Weapon::Rail { damage, .. }
            | Weapon::Stream { damage, .. }
            | Weapon::Laser { damage, .. } => damage,
        }
    }

    /// Seconds between volleys
    pub fn fire_interval(&self) -> f32 {
        match *self {
            Weapon::Pistol { interval, .. }
            | Weapon::Scatter { interval, .. }
            | Weapon::Rail { interval, .. }
            | Weapon::Stream { interval, .. }
            | Weapon::Laser { interval, .. } => interval,
        }
    }

    pub fn projectile_count(&self) -> u32 {
        match *self {
            Weapon::Scatter { count, .. } => count,
            _ => 1,
        }
    }

    /// Total fan angle (radians)
    pub fn spread(&self) -> f32 {
        match *self {
            Weapon::Scatter { spread, .. } => spread,
            _ => 0.0,
        }
    }

    pub fn pierce(&self) -> u32 {
        match *self {
            Weapon::Rail { pierce, .. } => pierce,
            _ => 0,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Weapon::Laser { .. })
    }

    pub fn projectile_radius(&self) -> f32 {
        if self.is_special() {
            SPECIAL_PROJECTILE_RADIUS
        } else {
            PROJECTILE_RADIUS
        }
    }

    pub fn tag(&self) -> ProjectileTag {
        match self {
            Weapon::Pistol { .. } => ProjectileTag::Standard,
            Weapon::Scatter { .. } => ProjectileTag::Shotgun,
            Weapon::Rail { .. } => ProjectileTag::Sniper,
            Weapon::Stream { .. } => ProjectileTag::Bubble,
            Weapon::Laser { .. } => ProjectileTag::Laser,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weapon::Pistol { .. } => "Neon Pistol",
            Weapon::Scatter { .. } => "Pulse Scatter",
            Weapon::Rail { .. } => "Orbital Rail",
            Weapon::Stream { .. } => "Plasma Stream",
            Weapon::Laser { .. } => "Superconductor Laser",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_ids_round_trip_names() {
        for id in WeaponId::ALL {
            assert_eq!(WeaponId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(WeaponId::from_str("flamethrower"), None);
    }

    #[test]
    fn test_kind_specific_parameters() {
        let shotgun = WeaponId::Shotgun.weapon();
        assert_eq!(shotgun.projectile_count(), 5);
        assert!((shotgun.spread() - 0.4).abs() < f32::EPSILON);
        assert_eq!(shotgun.pierce(), 0);

        let sniper = WeaponId::Sniper.weapon();
        assert_eq!(sniper.pierce(), 5);
        assert_eq!(sniper.projectile_count(), 1);
        assert_eq!(sniper.tag(), ProjectileTag::Sniper);
    }

    #[test]
    fn test_laser_is_special() {
        let laser = Weapon::laser();
        assert!(laser.is_special());
        assert_eq!(laser.projectile_radius(), SPECIAL_PROJECTILE_RADIUS);
        assert!(!WeaponId::Standard.weapon().is_special());
    }

    #[test]
    fn test_serde_names_are_lowercase() {
        let json = serde_json::to_string(&WeaponId::Sniper).unwrap();
        assert_eq!(json, "\"sniper\"");
    }
}
