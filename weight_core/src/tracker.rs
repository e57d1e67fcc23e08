//! User-facing operations on the weight log.
//!
//! `Tracker` owns the current `LogStore` snapshot and a persistence
//! collaborator. Every mutation runs against a copy of the snapshot; the
//! copy is saved first and only then becomes current, so a failed
//! validation or save leaves both memory and storage untouched.

use crate::log_store::{LogStore, Upsert};
use crate::persistence::LogPersistence;
use crate::{parse_date, reconcile, stats, Change, Result, Summary, WeightEntry};

/// The snapshot after a mutation together with what changed
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub snapshot: LogStore,
    pub change: Change,
}

/// How a parsed import file will be applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the log and use the imported entries verbatim (JSON backup)
    Restore,
    /// Upsert the imported entries by date (CSV)
    Merge,
}

/// An import that has been parsed but not applied.
///
/// Dropping it abandons the import; nothing reaches the log until
/// `Tracker::commit` is called.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingImport {
    mode: ImportMode,
    entries: Vec<WeightEntry>,
}

impl PendingImport {
    pub fn restore(entries: Vec<WeightEntry>) -> Self {
        Self {
            mode: ImportMode::Restore,
            entries,
        }
    }

    pub fn merge(entries: Vec<WeightEntry>) -> Self {
        Self {
            mode: ImportMode::Merge,
            entries,
        }
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Question to put to the user before committing
    pub fn confirmation_prompt(&self, current_len: usize) -> String {
        match self.mode {
            ImportMode::Restore => format!(
                "This will replace your current {} log(s) with {} imported log(s). Continue?",
                current_len,
                self.entries.len()
            ),
            ImportMode::Merge => format!(
                "This will add {} entries from CSV. Duplicate dates will be replaced. Continue?",
                self.entries.len()
            ),
        }
    }
}

/// The weight log plus its persistence hooks
pub struct Tracker<P: LogPersistence> {
    store: LogStore,
    persistence: P,
}

impl<P: LogPersistence> Tracker<P> {
    /// Hydrate the log from `persistence`
    pub fn open(persistence: P) -> Result<Self> {
        let store = LogStore::from_entries(persistence.load()?);
        if store.has_duplicate_dates() {
            tracing::warn!("Loaded log contains duplicate dates");
        }
        tracing::info!("Opened weight log with {} entries", store.len());
        Ok(Self { store, persistence })
    }

    /// Current snapshot
    pub fn snapshot(&self) -> &LogStore {
        &self.store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Derived statistics over the current snapshot
    pub fn compute_stats(&self) -> Summary {
        stats::compute_stats(self.store.entries())
    }

    /// Log a weight for a date, replacing any existing weight for that date
    pub fn log_or_update(&mut self, date: &str, weight: f64) -> Result<Outcome> {
        let entry = WeightEntry::parse(date, weight)?;

        let mut next = self.store.clone();
        let change = match next.upsert(entry) {
            Upsert::Created => Change::Created {
                date: entry.date(),
                weight,
            },
            Upsert::Updated => Change::Updated {
                date: entry.date(),
                weight,
            },
        };

        self.commit_snapshot(next, change)
    }

    /// Remove the entry for `date`. A missing date is reported, not an error.
    pub fn delete_entry(&mut self, date: &str) -> Result<Outcome> {
        let date = parse_date(date)?;

        let mut next = self.store.clone();
        match next.delete(date) {
            Some(_) => self.commit_snapshot(next, Change::Deleted { date }),
            None => {
                tracing::debug!("Delete of {} ignored, no such entry", date);
                Ok(Outcome {
                    snapshot: self.store.clone(),
                    change: Change::NotFound { date },
                })
            }
        }
    }

    /// Move the entry at `old_date` to `new_date` with `new_weight`.
    ///
    /// An entry already at `new_date` is overwritten.
    pub fn edit_entry(&mut self, old_date: &str, new_date: &str, new_weight: f64) -> Result<Outcome> {
        let from = parse_date(old_date)?;
        let entry = WeightEntry::parse(new_date, new_weight)?;

        let mut next = self.store.clone();
        let upsert = next.rename_and_upsert(from, entry);
        let change = Change::Edited {
            from,
            to: entry.date(),
            weight: entry.weight(),
            overwrote: upsert == Upsert::Updated,
        };

        self.commit_snapshot(next, change)
    }

    /// Substitute the whole log. Duplicate dates are kept as given.
    pub fn replace_all(&mut self, entries: Vec<WeightEntry>) -> Result<Outcome> {
        let previous = self.store.len();
        let mut next = self.store.clone();
        next.replace_all(entries);

        if next.has_duplicate_dates() {
            tracing::warn!("Restored log contains duplicate dates; they are kept as-is");
        }

        let change = Change::Restored {
            previous,
            restored: next.len(),
        };
        self.commit_snapshot(next, change)
    }

    /// Upsert a batch of entries by date
    pub fn merge_import(&mut self, entries: Vec<WeightEntry>) -> Result<Outcome> {
        let (next, report) = reconcile::merge_import(&self.store, &entries);
        self.commit_snapshot(next, Change::Merged(report))
    }

    /// Apply a confirmed import
    pub fn commit(&mut self, pending: PendingImport) -> Result<Outcome> {
        match pending.mode {
            ImportMode::Restore => self.replace_all(pending.entries),
            ImportMode::Merge => self.merge_import(pending.entries),
        }
    }

    fn commit_snapshot(&mut self, next: LogStore, change: Change) -> Result<Outcome> {
        self.persistence.save(next.entries())?;
        self.store = next;
        tracing::info!("{}", change);
        Ok(Outcome {
            snapshot: self.store.clone(),
            change,
        })
    }
}
