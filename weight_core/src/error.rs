//! Error types for the weight_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for weight_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed date or weight rejected at the input boundary
    #[error("Invalid entry: {0}")]
    Validation(String),

    /// JSON backup could not be parsed
    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    /// CSV import could not be parsed; `line` is 1-based and counts the header
    #[error("Invalid CSV at line {line}: {message}")]
    InvalidCsv { line: u64, message: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors caused by bad user input or a bad import file,
    /// as opposed to storage failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidBackup(_) | Error::InvalidCsv { .. }
        )
    }
}
