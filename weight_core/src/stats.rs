//! Summary statistics over a weight log.

use crate::{Summary, WeightEntry};

/// Compute average, extrema and chronological change.
///
/// An empty slice yields the all-zero `Summary`. `first` and `last` come from
/// the earliest and latest dates, not from insertion order. Ties on date are
/// broken by insertion order (stable sort).
pub fn compute_stats(entries: &[WeightEntry]) -> Summary {
    if entries.is_empty() {
        return Summary::default();
    }

    let (min, max) = entries
        .iter()
        .map(|e| e.weight())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), w| {
            (lo.min(w), hi.max(w))
        });

    let total: f64 = entries.iter().map(|e| e.weight()).sum();
    // rounding in the sum can push the mean just past an extreme
    let average = (total / entries.len() as f64).clamp(min, max);

    let mut by_date: Vec<&WeightEntry> = entries.iter().collect();
    by_date.sort_by_key(|e| e.date());
    let first = by_date[0].weight();
    let last = by_date[by_date.len() - 1].weight();

    tracing::trace!(count = entries.len(), average, "Computed summary");

    Summary {
        average,
        min,
        max,
        first,
        last,
        change: last - first,
    }
}
