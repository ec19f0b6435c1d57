//! # Error Module
//!
//! Error types for the image sanitizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Fatal vs contained** - only configuration problems abort a run;
//!   everything that happens to a single file stays inside its `FileResult`
//! - **Include context** - paths, limits, what went wrong
//! - **User-friendly messages** - non-technical users should understand

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SanitizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),
}

/// Errors in the engine configuration.
///
/// These are the only fatal errors: they are raised before any file is
/// touched, and abort the whole run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Worker count must be at least 1, got {value}")]
    InvalidWorkerCount { value: usize },

    #[error("Sanitize mode requires a destination directory")]
    MissingDestination,

    #[error("No source paths given")]
    NoSources,
}

/// Errors that occur while enumerating source files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while assembling the final report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing result for input #{index} ({path})")]
    MissingResult { index: usize, path: PathBuf },
}

/// Per-file processing errors.
///
/// These never abort the run. Each one is recorded on the `FileResult` of
/// the file it belongs to, with `action = Failed`, and the run continues.
/// The source path lives on the `FileResult`, so variants carry only the
/// failure reason.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileError {
    #[error("Failed to decode image: {reason}")]
    Decode { reason: String },

    #[error("Failed to write sanitized copy: {reason}")]
    Write { reason: String },

    #[error("Processing exceeded the per-file timeout of {limit_ms} ms")]
    Timeout { limit_ms: u64 },
}

/// A fault inside a single content heuristic.
///
/// Heuristic quality varies, so these are isolated: logged, recorded as a
/// note on the file, and never surfaced as a file failure.
#[derive(Error, Debug)]
#[error("Heuristic '{id}' failed: {reason}")]
pub struct HeuristicError {
    pub id: String,
    pub reason: String,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SanitizerError>;
