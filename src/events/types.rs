//! Event type definitions for progress reporting.

use crate::core::finding::Action;
use crate::core::report::Summary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the sanitization engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// File enumeration events
    Scan(ScanEvent),
    /// Per-file processing events
    File(FileEvent),
    /// Run-level events
    Engine(EngineEvent),
}

/// Events during file enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started
    Started { sources: Vec<PathBuf> },
    /// A file was found and queued for processing
    FileFound { path: PathBuf },
    /// An error occurred but enumeration continues
    Error { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_files: usize },
}

/// Events during per-file processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FileEvent {
    /// A worker picked up the file
    Started { path: PathBuf },
    /// Progress update after a file finished
    Progress(FileProgress),
    /// The file finished with the given action
    Completed { path: PathBuf, action: Action },
    /// The file failed but the run continues
    Failed { path: PathBuf, message: String },
}

/// Progress information during processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProgress {
    /// Number of files finished so far
    pub completed: usize,
    /// Total number of files in the run
    pub total: usize,
    /// File that just finished
    pub current_path: PathBuf,
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The run has started
    Started,
    /// Cancellation was requested; in-flight files are finishing
    Cancelling,
    /// The run completed and the report is final
    Completed {
        summary: Summary,
        duration_ms: u64,
    },
}
