//! # Image Sanitizer
//!
//! Scans images for sensitive embedded metadata and, on request, writes
//! stripped copies.
//!
//! ## Core Philosophy
//! - **Never touch sources** - sanitized output always goes to a copy
//! - **Nothing silently dropped** - every enumerated file appears in the
//!   final report with an explicit action or error
//! - **Best effort, documented** - detection is a fixed, extensible rule
//!   set plus declared heuristics, not a forensic guarantee
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation
//! layers:
//! - `core` - The sanitization engine
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Error types, fatal vs per-file
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SanitizerError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
