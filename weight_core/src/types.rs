//! Core domain types for the weight log.
//!
//! This module defines:
//! - `WeightEntry`, a validated `(date, weight)` measurement
//! - `Summary`, the derived statistics view
//! - `Change`, the description of what a mutation did

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used everywhere a date crosses a text boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Entries
// ============================================================================

/// One weight measurement. The date is the unique key within a log.
///
/// Construction always validates, including deserialization, so a
/// `WeightEntry` in hand is known to carry a finite, positive weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct WeightEntry {
    date: NaiveDate,
    weight: f64,
}

/// Unvalidated wire shape of an entry
#[derive(Deserialize)]
struct RawEntry {
    date: String,
    weight: f64,
}

impl TryFrom<RawEntry> for WeightEntry {
    type Error = Error;

    fn try_from(raw: RawEntry) -> Result<Self> {
        WeightEntry::parse(&raw.date, raw.weight)
    }
}

impl WeightEntry {
    /// Build an entry from an already-parsed date
    pub fn new(date: NaiveDate, weight: f64) -> Result<Self> {
        Ok(Self {
            date,
            weight: validate_weight(weight)?,
        })
    }

    /// Build an entry from a `YYYY-MM-DD` string
    pub fn parse(date: &str, weight: f64) -> Result<Self> {
        Self::new(parse_date(date)?, weight)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Parse a calendar date in strict `YYYY-MM-DD` form
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    // chrono accepts single-digit months and days; the key format does not
    if trimmed.len() != 10 {
        return Err(Error::Validation(format!(
            "date '{}' must be in YYYY-MM-DD form",
            input
        )));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| Error::Validation(format!("date '{}' is not valid: {}", input, e)))
}

/// Reject non-finite and non-positive weights
pub fn validate_weight(weight: f64) -> Result<f64> {
    if !weight.is_finite() {
        return Err(Error::Validation(format!(
            "weight {} is not a finite number",
            weight
        )));
    }
    if weight <= 0.0 {
        return Err(Error::Validation(format!(
            "weight must be greater than zero, got {}",
            weight
        )));
    }
    Ok(weight)
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregate view over a log. All zeros for an empty log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub first: f64,
    pub last: f64,
    pub change: f64,
}

// ============================================================================
// Change reporting
// ============================================================================

/// Counts produced by a merge-import
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Batch entries whose date was new to the log
    pub created: usize,
    /// Batch entries that replaced an entry with the same date
    pub updated: usize,
}

impl MergeReport {
    /// Number of batch entries processed
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// What a mutation did, for user notifications
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Created {
        date: NaiveDate,
        weight: f64,
    },
    Updated {
        date: NaiveDate,
        weight: f64,
    },
    Edited {
        from: NaiveDate,
        to: NaiveDate,
        weight: f64,
        /// The new date collided with a different entry, which was overwritten
        overwrote: bool,
    },
    Deleted {
        date: NaiveDate,
    },
    NotFound {
        date: NaiveDate,
    },
    Restored {
        previous: usize,
        restored: usize,
    },
    Merged(MergeReport),
}

impl Change {
    /// Render a one-line description using the given unit label
    pub fn describe(&self, unit: &str) -> String {
        match self {
            Change::Created { date, weight } => {
                format!("Logged {} {} for {}", weight, unit, date)
            }
            Change::Updated { date, weight } => {
                format!("Updated weight for {} to {} {}", date, weight, unit)
            }
            Change::Edited {
                to,
                weight,
                overwrote: true,
                ..
            } => format!("Updated weight for {} to {} {}", to, weight, unit),
            Change::Edited {
                from,
                to,
                weight,
                overwrote: false,
            } => format!("Changed from {} to {} with {} {}", from, to, weight, unit),
            Change::Deleted { date } => format!("Removed entry for {}", date),
            Change::NotFound { date } => format!("No entry for {}", date),
            Change::Restored { restored, .. } => {
                format!("Restored {} weight logs", restored)
            }
            Change::Merged(report) => format!(
                "Imported {} weight entries ({} new, {} replaced)",
                report.total(),
                report.created,
                report.updated
            ),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe("kg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_entry() {
        let entry = WeightEntry::parse("2024-01-08", 79.0).unwrap();
        assert_eq!(entry.date(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(entry.weight(), 79.0);
    }

    #[test]
    fn test_rejects_bad_weights() {
        for weight in [0.0, -1.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = WeightEntry::parse("2024-01-01", weight);
            assert!(
                matches!(result, Err(Error::Validation(_))),
                "weight {} should be rejected",
                weight
            );
        }
    }

    #[test]
    fn test_rejects_bad_dates() {
        for date in ["", "2024-1-5", "2024-02-30", "01/02/2024", "2024-13-01"] {
            assert!(
                matches!(parse_date(date), Err(Error::Validation(_))),
                "date {:?} should be rejected",
                date
            );
        }
    }

    #[test]
    fn test_serde_shape() {
        let entry = WeightEntry::parse("2024-01-01", 80.5).unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-01","weight":80.5}"#);

        let back: WeightEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_deserialize_validates() {
        let result = serde_json::from_str::<WeightEntry>(r#"{"date":"2024-01-01","weight":-3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_change_descriptions() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();

        assert_eq!(
            Change::Created { date, weight: 80.0 }.describe("kg"),
            "Logged 80 kg for 2024-01-01"
        );
        assert_eq!(
            Change::Updated { date, weight: 79.5 }.describe("lb"),
            "Updated weight for 2024-01-01 to 79.5 lb"
        );
        assert_eq!(
            Change::Edited {
                from: date,
                to: later,
                weight: 78.0,
                overwrote: false
            }
            .to_string(),
            "Changed from 2024-01-01 to 2024-01-08 with 78 kg"
        );
        assert_eq!(
            Change::Merged(MergeReport {
                created: 2,
                updated: 1
            })
            .to_string(),
            "Imported 3 weight entries (2 new, 1 replaced)"
        );
    }
}
