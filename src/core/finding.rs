//! # Finding Module
//!
//! The data model shared by every stage of the engine: what was detected
//! in a file, how it is classified, and what was done about it.
//!
//! ## Classification
//! Sensitivity is a function of category alone. Two findings with the same
//! category always carry the same sensitivity, no matter which file they
//! came from or which component produced them.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a finding is treated in sanitize mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sensitivity {
    /// Removed from the written copy in sanitize mode
    Sensitive,
    /// Recorded in the report, never removed
    Informational,
}

/// Classification of a detected metadata entry or heuristic signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// GPS position, altitude, bearing, timestamps from the GPS IFD
    ExifGps,
    /// Camera make/model, lens, serial numbers, owner name, software
    ExifDevice,
    /// Capture and digitization timestamps
    ExifTimestamp,
    /// An embedded preview image or fields from the thumbnail IFD
    Thumbnail,
    /// Everything else, including most heuristic signals
    Custom,
}

impl Category {
    /// The fixed sensitivity for this category.
    ///
    /// This is the single extension point for the classification rule set:
    /// sensitivity is never decided per finding.
    pub fn sensitivity(self) -> Sensitivity {
        match self {
            Category::ExifGps
            | Category::ExifDevice
            | Category::ExifTimestamp
            | Category::Thumbnail => Sensitivity::Sensitive,
            Category::Custom => Sensitivity::Informational,
        }
    }
}

/// One detected metadata entry or heuristic signal.
///
/// Immutable once created; construct through [`Finding::new`] so the
/// sensitivity always matches the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Tag identifier, e.g. `GPSLatitude` or `heuristic:embedded-thumbnail`
    pub tag: String,
    /// Classification of the entry
    pub category: Category,
    /// Raw value rendered as text
    pub value: String,
    /// Derived from the category at construction time
    pub sensitivity: Sensitivity,
}

impl Finding {
    /// Create a finding, deriving sensitivity from the category
    pub fn new(tag: impl Into<String>, category: Category, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            category,
            value: value.into(),
            sensitivity: category.sensitivity(),
        }
    }

    /// Whether this finding would be removed in sanitize mode
    pub fn is_sensitive(&self) -> bool {
        self.sensitivity == Sensitivity::Sensitive
    }
}

/// What the sanitizer did with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A sanitized copy was written to the destination
    Stripped,
    /// Findings were recorded; nothing was written (report-only mode)
    RecordedOnly,
    /// Nothing to do - unsupported format, existing output, or cancelled
    Skipped,
    /// Processing failed; see the attached error
    Failed,
}

/// The complete outcome for one input file.
///
/// Built in full by the worker that processed the file, then handed off.
/// Never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Path of the source file
    pub source: PathBuf,
    /// Path of the written copy; present only when `action == Stripped`
    pub dest: Option<PathBuf>,
    /// Findings in stable detection order
    pub findings: Vec<Finding>,
    /// What was done with the file
    pub action: Action,
    /// Present iff `action == Failed`
    pub error: Option<FileError>,
    /// Informational notes: skip reasons, degraded heuristics
    pub notes: Vec<String>,
}

impl FileResult {
    /// A sanitized copy was written successfully
    pub fn stripped(
        source: PathBuf,
        dest: PathBuf,
        findings: Vec<Finding>,
        notes: Vec<String>,
    ) -> Self {
        Self {
            source,
            dest: Some(dest),
            findings,
            action: Action::Stripped,
            error: None,
            notes,
        }
    }

    /// Findings were recorded without writing anything
    pub fn recorded(source: PathBuf, findings: Vec<Finding>, notes: Vec<String>) -> Self {
        Self {
            source,
            dest: None,
            findings,
            action: Action::RecordedOnly,
            error: None,
            notes,
        }
    }

    /// The file was deliberately left alone
    pub fn skipped(source: PathBuf, note: impl Into<String>) -> Self {
        Self {
            source,
            dest: None,
            findings: Vec::new(),
            action: Action::Skipped,
            error: None,
            notes: vec![note.into()],
        }
    }

    /// Processing failed; findings detected before the failure are kept
    pub fn failed(
        source: PathBuf,
        findings: Vec<Finding>,
        error: FileError,
        notes: Vec<String>,
    ) -> Self {
        Self {
            source,
            dest: None,
            findings,
            action: Action::Failed,
            error: Some(error),
            notes,
        }
    }

    /// Count of findings that would be removed in sanitize mode
    pub fn sensitive_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_sensitive()).count()
    }
}
