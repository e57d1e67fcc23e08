//! JSON backup export and restore.
//!
//! A backup is a JSON array of `{"date": "YYYY-MM-DD", "weight": n}` objects
//! in stored order, so restoring it reproduces the log exactly.

use crate::{Error, Result, WeightEntry};
use chrono::NaiveDate;
use std::path::Path;

/// Default file name for a backup taken on `today`
pub fn backup_file_name(today: NaiveDate) -> String {
    format!("weight-backup-{}.json", today)
}

/// Serialize entries as a pretty-printed JSON array
pub fn to_json(entries: &[WeightEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Parse a backup. Any syntax, shape or validation failure is `InvalidBackup`.
pub fn from_json(text: &str) -> Result<Vec<WeightEntry>> {
    serde_json::from_str::<Vec<WeightEntry>>(text).map_err(|e| Error::InvalidBackup(e.to_string()))
}

/// Write a backup file, creating parent directories as needed
pub fn export_backup(path: &Path, entries: &[WeightEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_json(entries)?)?;
    tracing::info!("Exported {} entries to {:?}", entries.len(), path);
    Ok(())
}

/// Read and parse a backup file
pub fn read_backup(path: &Path) -> Result<Vec<WeightEntry>> {
    let contents = std::fs::read_to_string(path)?;
    let entries = from_json(&contents)?;
    tracing::debug!("Read {} entries from backup {:?}", entries.len(), path);
    Ok(entries)
}
