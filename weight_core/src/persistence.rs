//! Persistence collaborators for the weight log.
//!
//! The tracker only sees the `LogPersistence` trait. `JsonFileStore` keeps
//! the log in a single JSON file with file locking and atomic replacement;
//! `MemoryStore` is an in-memory stand-in for tests and dry runs.

use crate::{backup, Error, Result, WeightEntry};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the log inside the data directory
pub const LOG_FILE_NAME: &str = "weights.json";

/// Load/save hooks for the log
pub trait LogPersistence {
    /// Read the stored log. A missing log is an empty one.
    fn load(&self) -> Result<Vec<WeightEntry>>;

    /// Replace the stored log with `entries`
    fn save(&mut self, entries: &[WeightEntry]) -> Result<()>;
}

/// JSON file store with shared-lock reads and atomic, locked writes
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/weights.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable log is moved so later saves cannot overwrite it
    pub fn corrupt_path(&self) -> PathBuf {
        self.with_suffix(".corrupt")
    }

    /// First of `corrupt_path()`, `.corrupt.1`, `.corrupt.2`, ... that does not exist yet
    fn next_corrupt_path(&self) -> PathBuf {
        let mut candidate = self.corrupt_path();
        let mut n = 1u32;
        while candidate.exists() {
            candidate = self.with_suffix(&format!(".corrupt.{}", n));
            n += 1;
        }
        candidate
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn read_locked(&self) -> Result<String> {
        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        Ok(contents)
    }
}

impl LogPersistence for JsonFileStore {
    /// Missing file yields an empty log. A file that does not parse is moved
    /// to the first unused quarantine path (`corrupt_path()`, then `.1`,
    /// `.2`, ...) with a warning and an empty log is returned.
    fn load(&self) -> Result<Vec<WeightEntry>> {
        if !self.path.exists() {
            tracing::info!("No log file found at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let contents = self.read_locked()?;

        match backup::from_json(&contents) {
            Ok(entries) => {
                tracing::debug!("Loaded {} entries from {:?}", entries.len(), self.path);
                Ok(entries)
            }
            Err(e) => {
                let aside = self.next_corrupt_path();
                tracing::warn!(
                    "Failed to parse log file {:?}: {}. Moving it to {:?} and starting empty.",
                    self.path,
                    e,
                    aside
                );
                std::fs::rename(&self.path, &aside)?;
                Ok(Vec::new())
            }
        }
    }

    /// Atomically writes the log by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&mut self, entries: &[WeightEntry]) -> Result<()> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir)?;

        let temp = NamedTempFile::new_in(&dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(entries)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

/// In-memory persistence that records how often it was saved
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Vec<WeightEntry>,
    saves: usize,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with entries already "on disk"
    pub fn with_entries(entries: Vec<WeightEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// A store whose saves always fail
    pub fn read_only(entries: Vec<WeightEntry>) -> Self {
        Self {
            entries,
            saves: 0,
            read_only: true,
        }
    }

    pub fn stored(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl LogPersistence for MemoryStore {
    fn load(&self) -> Result<Vec<WeightEntry>> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, entries: &[WeightEntry]) -> Result<()> {
        if self.read_only {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory store is read-only",
            )));
        }
        self.entries = entries.to_vec();
        self.saves += 1;
        Ok(())
    }
}
