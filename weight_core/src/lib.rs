#![forbid(unsafe_code)]

//! Core domain model and data reconciliation for the weigh weight log.
//!
//! This crate provides:
//! - Domain types (entries, summaries, change reports)
//! - The keyed log store and merge-import reconciliation
//! - Summary statistics
//! - JSON backup and CSV codecs
//! - Persistence and the `Tracker` service

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod log_store;
pub mod stats;
pub mod reconcile;
pub mod backup;
pub mod csv_format;
pub mod persistence;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use log_store::{LogStore, Upsert};
pub use stats::compute_stats;
pub use reconcile::merge_import;
pub use persistence::{JsonFileStore, LogPersistence, MemoryStore};
pub use tracker::{ImportMode, Outcome, PendingImport, Tracker};
