//! Merge-import of an external batch into an existing log.

use crate::log_store::{LogStore, Upsert};
use crate::{MergeReport, WeightEntry};

/// Upsert every batch entry, in batch order, into a copy of `current`.
///
/// Existing dates are replaced in place and new dates are appended. A later
/// batch entry wins over an earlier one with the same date, and any batch
/// entry wins over the log.
pub fn merge_import(current: &LogStore, batch: &[WeightEntry]) -> (LogStore, MergeReport) {
    let mut result = current.clone();
    let mut report = MergeReport::default();

    for entry in batch {
        match result.upsert(*entry) {
            Upsert::Created => report.created += 1,
            Upsert::Updated => report.updated += 1,
        }
    }

    tracing::debug!(
        created = report.created,
        updated = report.updated,
        "Merged import batch"
    );

    (result, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entry(date: &str, weight: f64) -> WeightEntry {
        WeightEntry::parse(date, weight).unwrap()
    }

    fn current() -> LogStore {
        LogStore::from_entries(vec![entry("2024-01-01", 80.0), entry("2024-01-08", 79.0)])
    }

    #[test]
    fn test_merge_replaces_and_appends() {
        let batch = [entry("2024-01-08", 78.5), entry("2024-01-15", 77.0)];
        let (merged, report) = merge_import(&current(), &batch);

        assert_eq!(
            merged.entries(),
            &[
                entry("2024-01-01", 80.0),
                entry("2024-01-08", 78.5),
                entry("2024-01-15", 77.0),
            ]
        );
        assert_eq!(report, MergeReport { created: 1, updated: 1 });
    }

    #[test]
    fn test_merge_leaves_input_untouched() {
        let before = current();
        let _ = merge_import(&before, &[entry("2024-01-01", 70.0)]);
        assert_eq!(before, current());
    }

    #[test]
    fn test_later_batch_entries_win() {
        let batch = [
            entry("2024-02-01", 75.0),
            entry("2024-02-01", 74.0),
            entry("2024-01-01", 90.0),
            entry("2024-01-01", 91.0),
        ];
        let (merged, report) = merge_import(&current(), &batch);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.entries()[0], entry("2024-01-01", 91.0));
        assert_eq!(merged.entries()[2], entry("2024-02-01", 74.0));
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 3);
        assert!(!merged.has_duplicate_dates());
    }

    #[test]
    fn test_merge_insensitive_to_preflattening() {
        let batch = [
            entry("2024-01-15", 77.0),
            entry("2024-01-01", 81.0),
            entry("2024-01-22", 76.0),
        ];

        let (flattened, _) = merge_import(&LogStore::new(), &batch);
        let (via_flat, _) = merge_import(&current(), flattened.entries());
        let (direct, _) = merge_import(&current(), &batch);

        assert_eq!(via_flat, direct);
    }

    #[test]
    fn test_at_most_one_entry_per_date() {
        let batch = [
            entry("2024-01-08", 70.0),
            entry("2024-03-01", 71.0),
            entry("2024-01-01", 72.0),
        ];
        let (merged, _) = merge_import(&current(), &batch);

        let dates: HashSet<_> = merged.entries().iter().map(|e| e.date()).collect();
        assert_eq!(dates.len(), merged.len());
    }

    #[test]
    fn test_empty_batch_is_identity() {
        let (merged, report) = merge_import(&current(), &[]);
        assert_eq!(merged, current());
        assert_eq!(report.total(), 0);
    }
}
