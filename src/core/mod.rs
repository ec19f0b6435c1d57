//! # Core Module
//!
//! The UI-agnostic sanitization engine.
//!
//! ## Modules
//! - `scanner` - Enumerates input files in a stable order
//! - `inspector` - Reads and classifies embedded EXIF metadata
//! - `heuristics` - Pluggable content heuristics with fault isolation
//! - `sanitizer` - The per-file detect/strip/write algorithm
//! - `pool` - Fixed-size worker pool over a shared job queue
//! - `report` - Order-restoring result aggregation
//! - `engine` - Orchestrates the full run
//! - `finding` - The shared data model

pub mod engine;
pub mod finding;
pub mod heuristics;
pub mod inspector;
pub mod pool;
pub mod report;
pub mod sanitizer;
pub mod scanner;

// Re-export commonly used types
pub use engine::{Engine, EngineBuilder, EngineConfig, Mode};
pub use finding::{Action, Category, FileResult, Finding, Sensitivity};
pub use heuristics::{Heuristic, HeuristicKind, HeuristicRegistry};
pub use pool::CancelToken;
pub use report::{Report, Summary};
pub use scanner::SourceFile;
