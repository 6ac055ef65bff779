//! Cross-run progression persistence
//!
//! - Versioned JSON schema with migration from older layouts
//! - Shop and loadout operations on the record
//! - Store collaborators (in-memory, JSON file)

pub mod record;
pub mod store;

pub use record::{
    MAX_EQUIPPED, MAX_UPGRADE_LEVEL, ProgressionRecord, RECORD_VERSION, UpgradeKind, Upgrades,
};
pub use store::{JsonFileStore, MemoryStore, ProgressionStore};
