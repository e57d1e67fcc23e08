//! CSV export, template and import.
//!
//! The format is a `date,weight` header followed by one row per entry.
//! Import is all-or-nothing: the first bad row rejects the file and the
//! error names its line number.

use crate::{Error, Result, WeightEntry};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;

const HEADER: [&str; 2] = ["date", "weight"];

/// Weight shown in the template's example row
const EXAMPLE_WEIGHT: f64 = 70.0;

/// File name used for the downloadable template
pub const TEMPLATE_FILE_NAME: &str = "weight-template.csv";

/// Default file name for a CSV export taken on `today`
pub fn csv_file_name(today: NaiveDate) -> String {
    format!("weight-logs-{}.csv", today)
}

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    weight: f64,
}

impl From<&WeightEntry> for CsvRow {
    fn from(entry: &WeightEntry) -> Self {
        CsvRow {
            date: entry.date().to_string(),
            weight: entry.weight(),
        }
    }
}

/// Write entries, oldest first, with a header row
pub fn write_csv<W: Write>(writer: W, entries: &[WeightEntry]) -> Result<()> {
    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date());

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for entry in sorted {
        writer.serialize(CsvRow::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the template: header, plus an example row dated `example` if given
pub fn write_template<W: Write>(writer: W, example: Option<NaiveDate>) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    if let Some(date) = example {
        writer.serialize(CsvRow {
            date: date.to_string(),
            weight: EXAMPLE_WEIGHT,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Render entries as a CSV string
pub fn to_csv(entries: &[WeightEntry]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, entries)?;
    String::from_utf8(buffer).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Parse a CSV import. Column order is free; header names are case-insensitive.
pub fn from_csv<R: Read>(reader: R) -> Result<Vec<WeightEntry>> {
    // Flexible so whitespace-only lines reach us as blank records; width is checked below
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(row_error)?.clone();
    let date_col = find_column(&headers, "date")?;
    let weight_col = find_column(&headers, "weight")?;

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result.map_err(row_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != headers.len() {
            return Err(Error::InvalidCsv {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        entries.push(parse_record(&record, date_col, weight_col, line)?);
    }

    if entries.is_empty() {
        return Err(Error::InvalidCsv {
            line: 1,
            message: "file contains a header but no data rows".into(),
        });
    }

    tracing::debug!("Parsed {} entries from CSV", entries.len());
    Ok(entries)
}

/// Write a CSV export file, creating parent directories as needed
pub fn export_csv(path: &Path, entries: &[WeightEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(file, entries)?;
    tracing::info!("Exported {} entries to {:?}", entries.len(), path);
    Ok(())
}

/// Write the template file
pub fn export_template(path: &Path, example: Option<NaiveDate>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_template(file, example)?;
    tracing::info!("Wrote CSV template to {:?}", path);
    Ok(())
}

/// Read and parse a CSV import file
pub fn read_csv(path: &Path) -> Result<Vec<WeightEntry>> {
    let file = std::fs::File::open(path)?;
    from_csv(file)
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::InvalidCsv {
            line: 1,
            message: format!("missing '{}' column in header", name),
        })
}

fn parse_record(
    record: &StringRecord,
    date_col: usize,
    weight_col: usize,
    line: u64,
) -> Result<WeightEntry> {
    let date = record.get(date_col).unwrap_or_default();
    let weight_text = record.get(weight_col).unwrap_or_default();

    let weight: f64 = weight_text.parse().map_err(|_| Error::InvalidCsv {
        line,
        message: format!("weight '{}' is not a number", weight_text),
    })?;

    WeightEntry::parse(date, weight).map_err(|e| match e {
        Error::Validation(message) => Error::InvalidCsv { line, message },
        other => other,
    })
}

fn row_error(e: csv::Error) -> Error {
    let line = e.position().map(|p| p.line()).unwrap_or(1);
    let message = match e.kind() {
        csv::ErrorKind::Utf8 { err, .. } => {
            format!("invalid UTF-8 in field {}", err.field() + 1)
        }
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        csv::ErrorKind::Io(err) => format!("read failed: {}", err),
        _ => "malformed record".to_string(),
    };
    Error::InvalidCsv { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, weight: f64) -> WeightEntry {
        WeightEntry::parse(date, weight).unwrap()
    }

    fn line_of(result: Result<Vec<WeightEntry>>) -> u64 {
        match result {
            Err(Error::InvalidCsv { line, .. }) => line,
            other => panic!("expected InvalidCsv, got {:?}", other),
        }
    }

    #[test]
    fn test_export_is_chronological() {
        let csv = to_csv(&[entry("2024-01-08", 79.5), entry("2024-01-01", 80.0)]).unwrap();
        assert_eq!(csv, "date,weight\n2024-01-01,80.0\n2024-01-08,79.5\n");
    }

    #[test]
    fn test_export_then_import() {
        let entries = vec![entry("2024-01-01", 80.0), entry("2024-01-08", 79.5)];
        let csv = to_csv(&entries).unwrap();
        assert_eq!(from_csv(csv.as_bytes()).unwrap(), entries);
    }

    #[test]
    fn test_import_tolerates_layout() {
        let input = "Weight , DATE\n 78.2 , 2024-02-01 \n\n77.9,2024-02-02\n";
        let entries = from_csv(input.as_bytes()).unwrap();
        assert_eq!(
            entries,
            vec![entry("2024-02-01", 78.2), entry("2024-02-02", 77.9)]
        );
    }

    #[test]
    fn test_bad_weight_names_line() {
        let input = "date,weight\n2024-01-01,80\n2024-01-02,heavy\n";
        assert_eq!(line_of(from_csv(input.as_bytes())), 3);
    }

    #[test]
    fn test_bad_date_names_line() {
        let input = "date,weight\n2024-01-01,80\n2024-01-02,79\n01/03/2024,78\n";
        assert_eq!(line_of(from_csv(input.as_bytes())), 4);
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let input = "date,weight\n2024-01-01,-80\n";
        assert_eq!(line_of(from_csv(input.as_bytes())), 2);
    }

    #[test]
    fn test_missing_column_rejected() {
        let input = "day,kg\n2024-01-01,80\n";
        assert_eq!(line_of(from_csv(input.as_bytes())), 1);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let input = "date,weight\n2024-01-01,80\n2024-01-02,79,extra\n";
        match from_csv(input.as_bytes()) {
            Err(Error::InvalidCsv { line, message }) => {
                assert_eq!(line, 3);
                assert_eq!(message, "expected 2 fields, found 3");
            }
            other => panic!("expected InvalidCsv, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_lines_skipped() {
        let input = "date,weight\n2024-01-01,80\n   \n\t\n2024-01-02,79\n";
        let entries = from_csv(input.as_bytes()).unwrap();
        assert_eq!(
            entries,
            vec![entry("2024-01-01", 80.0), entry("2024-01-02", 79.0)]
        );
    }

    #[test]
    fn test_invalid_utf8_names_line_once() {
        let input: &[u8] = b"date,weight\n2024-01-01,8\xff0\n";
        let message = from_csv(input).unwrap_err().to_string();
        assert!(message.starts_with("Invalid CSV at line 2:"), "{}", message);
        assert_eq!(message.matches("line").count(), 1, "{}", message);
    }

    #[test]
    fn test_template_with_example_parses() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut buffer = Vec::new();
        write_template(&mut buffer, Some(date)).unwrap();

        let entries = from_csv(buffer.as_slice()).unwrap();
        assert_eq!(entries, vec![WeightEntry::new(date, EXAMPLE_WEIGHT).unwrap()]);
    }

    #[test]
    fn test_header_only_template_is_empty_import() {
        let mut buffer = Vec::new();
        write_template(&mut buffer, None).unwrap();
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "date,weight\n");
        assert_eq!(line_of(from_csv(buffer.as_slice())), 1);
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("logs.csv");

        let entries = vec![entry("2024-01-01", 80.0)];
        export_csv(&path, &entries).unwrap();
        assert_eq!(read_csv(&path).unwrap(), entries);
    }
}
