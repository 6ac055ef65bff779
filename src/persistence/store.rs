//! Progression storage collaborators
//!
//! The simulation never touches storage itself; the host loads a record before
//! a run and saves whatever the run hands back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::record::ProgressionRecord;
use crate::error::RecordError;

/// Where progression records live between runs
pub trait ProgressionStore {
    /// Stored record, or the default when nothing usable is stored
    fn load(&self) -> ProgressionRecord;

    fn save(&mut self, record: &ProgressionRecord) -> Result<(), RecordError>;
}

/// In-memory store for tests and embedding hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<ProgressionRecord>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: ProgressionRecord) -> Self {
        Self {
            record: Some(record),
            saves: 0,
        }
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl ProgressionStore for MemoryStore {
    fn load(&self) -> ProgressionRecord {
        self.record.clone().unwrap_or_default()
    }

    fn save(&mut self, record: &ProgressionRecord) -> Result<(), RecordError> {
        self.record = Some(record.clone());
        self.saves += 1;
        Ok(())
    }
}

/// JSON file store. Saves go through a temporary file and a rename so a
/// crash mid-write never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl ProgressionStore for JsonFileStore {
    fn load(&self) -> ProgressionRecord {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No progression record at {}, starting fresh", self.path.display());
                return ProgressionRecord::default();
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}, using defaults", self.path.display(), e);
                return ProgressionRecord::default();
            }
        };

        match ProgressionRecord::from_json(&json) {
            Ok(record) => {
                log::info!(
                    "Loaded progression record ({} currency, {} weapons owned)",
                    record.currency,
                    record.owned.len()
                );
                record
            }
            Err(e) => {
                log::warn!("Ignoring progression record at {}: {}", self.path.display(), e);
                ProgressionRecord::default()
            }
        }
    }

    fn save(&mut self, record: &ProgressionRecord) -> Result<(), RecordError> {
        let json = record.to_json()?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Progression record saved to {}", self.path.display());
        Ok(())
    }
}
