//! The in-memory weight log.
//!
//! Entries keep insertion order for display. Nothing downstream relies on
//! that order for correctness; anything chronological sorts explicitly.

use crate::WeightEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of a keyed upsert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    /// The date was new and the entry was appended
    Created,
    /// An entry with the date existed and its weight was replaced in place
    Updated,
}

/// Ordered collection of weight entries keyed by date
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogStore {
    entries: Vec<WeightEntry>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing sequence verbatim
    pub fn from_entries(entries: Vec<WeightEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, date: NaiveDate) -> Option<usize> {
        self.entries.iter().position(|e| e.date() == date)
    }

    /// Look up the entry for a date
    pub fn get(&self, date: NaiveDate) -> Option<&WeightEntry> {
        self.entries.iter().find(|e| e.date() == date)
    }

    /// Insert or replace by date. Replacement keeps the existing position.
    pub fn upsert(&mut self, entry: WeightEntry) -> Upsert {
        match self.position(entry.date()) {
            Some(index) => {
                self.entries[index] = entry;
                Upsert::Updated
            }
            None => {
                self.entries.push(entry);
                Upsert::Created
            }
        }
    }

    /// Remove the entry at `old_date`, then upsert `entry` into what remains.
    ///
    /// If another entry already sits at the new date it is overwritten in
    /// place. Returns `Upsert::Updated` in that case.
    pub fn rename_and_upsert(&mut self, old_date: NaiveDate, entry: WeightEntry) -> Upsert {
        self.entries.retain(|e| e.date() != old_date);
        self.upsert(entry)
    }

    /// Remove the entry for `date`, returning it if it was present
    pub fn delete(&mut self, date: NaiveDate) -> Option<WeightEntry> {
        let index = self.position(date)?;
        Some(self.entries.remove(index))
    }

    /// Discard everything and store `entries` as given. No deduplication.
    pub fn replace_all(&mut self, entries: Vec<WeightEntry>) {
        self.entries = entries;
    }

    /// Most recently appended entry, used for the "last logged" hint
    pub fn latest_logged(&self) -> Option<&WeightEntry> {
        self.entries.last()
    }

    /// Copy of the entries sorted by date ascending (stable for equal dates)
    pub fn chronological(&self) -> Vec<WeightEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| e.date());
        sorted
    }

    /// True if any date appears more than once, which only a replace-all can cause
    pub fn has_duplicate_dates(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.entries.len());
        self.entries.iter().any(|e| !seen.insert(e.date()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, weight: f64) -> WeightEntry {
        WeightEntry::parse(date, weight).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        crate::parse_date(s).unwrap()
    }

    fn sample() -> LogStore {
        LogStore::from_entries(vec![
            entry("2024-01-01", 80.0),
            entry("2024-01-08", 79.0),
            entry("2024-01-15", 78.0),
        ])
    }

    #[test]
    fn test_upsert_new_date_appends() {
        let mut store = sample();
        let outcome = store.upsert(entry("2024-01-22", 77.5));

        assert_eq!(outcome, Upsert::Created);
        assert_eq!(store.len(), 4);
        assert_eq!(store.entries()[3], entry("2024-01-22", 77.5));
    }

    #[test]
    fn test_upsert_existing_date_keeps_position_and_size() {
        let mut store = sample();
        let outcome = store.upsert(entry("2024-01-08", 78.5));

        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(store.len(), 3);
        assert_eq!(store.entries()[1], entry("2024-01-08", 78.5));
    }

    #[test]
    fn test_rename_into_existing_date_overwrites() {
        let mut store = sample();
        let outcome = store.rename_and_upsert(date("2024-01-01"), entry("2024-01-08", 78.0));

        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(store.len(), 2);
        assert!(store.get(date("2024-01-01")).is_none());
        assert_eq!(store.get(date("2024-01-08")).unwrap().weight(), 78.0);
        // collided entry keeps its slot
        assert_eq!(store.entries()[0].date(), date("2024-01-08"));
    }

    #[test]
    fn test_rename_to_free_date_moves_entry_to_end() {
        let mut store = sample();
        let outcome = store.rename_and_upsert(date("2024-01-01"), entry("2024-01-02", 80.2));

        assert_eq!(outcome, Upsert::Created);
        assert_eq!(store.len(), 3);
        assert_eq!(store.latest_logged(), Some(&entry("2024-01-02", 80.2)));
    }

    #[test]
    fn test_rename_same_date_reappends() {
        let mut store = sample();
        store.rename_and_upsert(date("2024-01-01"), entry("2024-01-01", 81.0));

        assert_eq!(store.len(), 3);
        assert_eq!(store.entries()[2], entry("2024-01-01", 81.0));
    }

    #[test]
    fn test_delete() {
        let mut store = sample();
        let removed = store.delete(date("2024-01-08"));
        assert_eq!(removed, Some(entry("2024-01-08", 79.0)));
        assert_eq!(store.len(), 2);

        // Missing date is a no-op
        assert_eq!(store.delete(date("2023-12-25")), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_all_keeps_duplicates() {
        let mut store = sample();
        store.replace_all(vec![entry("2024-02-01", 75.0), entry("2024-02-01", 74.0)]);

        assert_eq!(store.len(), 2);
        assert!(store.has_duplicate_dates());
    }

    #[test]
    fn test_chronological_sorts_copy() {
        let store = LogStore::from_entries(vec![
            entry("2024-01-08", 79.0),
            entry("2024-01-01", 80.0),
        ]);
        let sorted = store.chronological();

        assert_eq!(sorted[0].date(), date("2024-01-01"));
        // original order untouched
        assert_eq!(store.entries()[0].date(), date("2024-01-08"));
    }
}
