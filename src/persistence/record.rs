//! Cross-run progression record
//!
//! Stored as a versioned JSON document. Version 1 blobs (no upgrades, camelCase
//! field names) are migrated on load; unknown weapon ids are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RecordError, ShopError};
use crate::sim::WeaponId;

/// Current schema version
pub const RECORD_VERSION: u32 = 2;

/// Most weapons a loadout may carry into a run
pub const MAX_EQUIPPED: usize = 2;

/// Highest purchasable level for any upgrade
pub const MAX_UPGRADE_LEVEL: u32 = 10;

/// Permanent stat upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    /// +10 max health per level
    Vitality,
    /// +10% damage per level
    Firepower,
    /// +5% movement speed per level
    Mobility,
}

impl UpgradeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Vitality => "vitality",
            UpgradeKind::Firepower => "firepower",
            UpgradeKind::Mobility => "mobility",
        }
    }

    /// Price of going from `level` to `level + 1`
    pub fn cost(level: u32) -> u32 {
        20 * (level + 1)
    }
}

/// Purchased upgrade levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub vitality: u32,
    pub firepower: u32,
    pub mobility: u32,
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Vitality => self.vitality,
            UpgradeKind::Firepower => self.firepower,
            UpgradeKind::Mobility => self.mobility,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Vitality => &mut self.vitality,
            UpgradeKind::Firepower => &mut self.firepower,
            UpgradeKind::Mobility => &mut self.mobility,
        }
    }
}

/// Everything that survives between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionRecord {
    pub currency: u32,
    /// Purchased weapons; always contains the baseline
    pub owned: Vec<WeaponId>,
    /// Loadout for the next run; 1..=MAX_EQUIPPED owned weapons
    pub equipped: Vec<WeaponId>,
    pub upgrades: Upgrades,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            currency: 0,
            owned: vec![WeaponId::BASELINE],
            equipped: vec![WeaponId::BASELINE],
            upgrades: Upgrades::default(),
        }
    }
}

/// On-disk shape, version 2
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    #[serde(default)]
    currency: u32,
    #[serde(default)]
    owned: Vec<String>,
    #[serde(default)]
    equipped: Vec<String>,
    #[serde(default)]
    upgrades: Upgrades,
}

/// On-disk shape, version 1
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecordV1 {
    #[serde(default)]
    total_bread: u32,
    #[serde(default)]
    owned_weapons: Vec<String>,
    #[serde(default)]
    equipped_weapons: Vec<String>,
}

fn parse_ids(ids: &[String]) -> Vec<WeaponId> {
    let mut out = Vec::with_capacity(ids.len());
    for raw in ids {
        match WeaponId::from_str(raw) {
            Some(id) if !out.contains(&id) => out.push(id),
            Some(_) => {}
            None => log::warn!("Dropping unknown weapon id '{}' from progression record", raw),
        }
    }
    out
}

impl ProgressionRecord {
    /// Decode a stored record, migrating older versions
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(json)?;
        let version = value
            .get("version")
            .and_then(Value::as_u64)
            .unwrap_or(1);

        let record = match version {
            v if v > u64::from(RECORD_VERSION) => {
                return Err(RecordError::UnsupportedVersion {
                    found: v,
                    supported: RECORD_VERSION,
                });
            }
            1 => {
                let old: StoredRecordV1 = serde_json::from_value(value)?;
                log::info!("Migrating progression record from version 1");
                Self {
                    currency: old.total_bread,
                    owned: parse_ids(&old.owned_weapons),
                    equipped: parse_ids(&old.equipped_weapons),
                    upgrades: Upgrades::default(),
                }
            }
            _ => {
                let stored: StoredRecord = serde_json::from_value(value)?;
                Self {
                    currency: stored.currency,
                    owned: parse_ids(&stored.owned),
                    equipped: parse_ids(&stored.equipped),
                    upgrades: stored.upgrades,
                }
            }
        };
        Ok(record.normalized())
    }

    /// Encode as the current schema version
    pub fn to_json(&self) -> Result<String, RecordError> {
        let stored = StoredRecord {
            version: RECORD_VERSION,
            currency: self.currency,
            owned: self.owned.iter().map(|w| w.as_str().to_string()).collect(),
            equipped: self.equipped.iter().map(|w| w.as_str().to_string()).collect(),
            upgrades: self.upgrades,
        };
        Ok(serde_json::to_string_pretty(&stored)?)
    }

    /// Restore the ownership and loadout rules after decoding
    fn normalized(mut self) -> Self {
        if !self.owned.contains(&WeaponId::BASELINE) {
            self.owned.insert(0, WeaponId::BASELINE);
        }
        let owned = self.owned.clone();
        self.equipped.retain(|w| owned.contains(w));
        self.equipped.truncate(MAX_EQUIPPED);
        if self.equipped.is_empty() {
            self.equipped.push(WeaponId::BASELINE);
        }
        self
    }

    pub fn owns(&self, id: WeaponId) -> bool {
        self.owned.contains(&id)
    }

    pub fn purchase_weapon(&mut self, id: WeaponId) -> Result<(), ShopError> {
        if self.owns(id) {
            return Err(ShopError::AlreadyOwned(id));
        }
        let price = id.price();
        if self.currency < price {
            return Err(ShopError::Unaffordable {
                price,
                balance: self.currency,
            });
        }
        self.currency -= price;
        self.owned.push(id);
        log::info!("Purchased {} for {}", id.as_str(), price);
        Ok(())
    }

    /// Buy the next level of an upgrade. Returns the new level.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, ShopError> {
        let level = self.upgrades.level(kind);
        if level >= MAX_UPGRADE_LEVEL {
            return Err(ShopError::MaxLevel(kind));
        }
        let price = UpgradeKind::cost(level);
        if self.currency < price {
            return Err(ShopError::Unaffordable {
                price,
                balance: self.currency,
            });
        }
        self.currency -= price;
        let slot = self.upgrades.level_mut(kind);
        *slot += 1;
        log::info!("Upgraded {} to level {}", kind.as_str(), *slot);
        Ok(*slot)
    }

    /// Equip or unequip an owned weapon. Returns whether it is now equipped.
    pub fn toggle_equip(&mut self, id: WeaponId) -> Result<bool, ShopError> {
        if !self.owns(id) {
            return Err(ShopError::NotOwned(id));
        }
        if let Some(i) = self.equipped.iter().position(|&w| w == id) {
            if self.equipped.len() == 1 {
                return Err(ShopError::LastEquipped);
            }
            self.equipped.remove(i);
            Ok(false)
        } else {
            if self.equipped.len() >= MAX_EQUIPPED {
                return Err(ShopError::LoadoutFull(self.equipped.len()));
            }
            self.equipped.push(id);
            Ok(true)
        }
    }

    /// Bank the currency a successful run carried out
    pub fn apply_extraction(&mut self, currency: u32) {
        self.currency = self.currency.saturating_add(currency);
    }

    /// Failure resets the loadout to the baseline; owned weapons are kept
    pub fn apply_death_rollback(&mut self) {
        self.equipped = vec![WeaponId::BASELINE];
    }
}
