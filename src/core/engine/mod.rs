//! # Engine Module
//!
//! Orchestrates the full run: validate configuration, enumerate files,
//! fan out across the worker pool, aggregate into the final report.
//!
//! ## Example
//! ```rust,ignore
//! use image_sanitizer::core::engine::{Engine, Mode};
//!
//! let engine = Engine::builder()
//!     .sources(vec!["/photos".into()])
//!     .mode(Mode::Sanitize)
//!     .dest("/sanitized".into())
//!     .workers(4)
//!     .build()?;
//!
//! let report = engine.run()?;
//! ```

mod builder;

pub use builder::EngineBuilder;

use crate::core::finding::Action;
use crate::core::heuristics::{HeuristicKind, HeuristicRegistry};
use crate::core::pool::{self, CancelToken};
use crate::core::report::{Aggregator, Report};
use crate::core::sanitizer;
use crate::core::scanner::{FileWalker, ScanConfig};
use crate::error::{ConfigError, Result};
use crate::events::{null_sender, EngineEvent, Event, EventSender, FileEvent, FileProgress};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// What the engine does with sensitive findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Write sanitized copies under the destination root
    Sanitize,
    /// Record findings only; never write anything
    ReportOnly,
}

/// Configuration for a run.
///
/// Owned by the caller, read-only to the engine, immutable for the
/// duration of the run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of worker threads (must be >= 1)
    pub workers: usize,
    /// Sanitize or report-only
    pub mode: Mode,
    /// Source roots: directories walked recursively, or single files
    pub sources: Vec<PathBuf>,
    /// Destination root, required in sanitize mode
    pub dest: Option<PathBuf>,
    /// Content heuristics enabled for this run
    pub heuristics: Vec<HeuristicKind>,
    /// Optional per-file processing timeout
    pub timeout: Option<Duration>,
    /// Replace existing destination files instead of skipping them
    pub overwrite: bool,
    /// File enumeration options
    pub scan: ScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            mode: Mode::ReportOnly,
            sources: Vec::new(),
            dest: None,
            heuristics: vec![
                HeuristicKind::GpsPrecision,
                HeuristicKind::EmbeddedThumbnail,
                HeuristicKind::MakerNote,
            ],
            timeout: None,
            overwrite: false,
            scan: ScanConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check the configuration before any work starts.
    ///
    /// These are the only fatal errors in the system; everything after
    /// this point is contained per file.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                value: self.workers,
            });
        }
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.mode == Mode::Sanitize && self.dest.is_none() {
            return Err(ConfigError::MissingDestination);
        }
        Ok(())
    }
}

/// The sanitization engine
pub struct Engine {
    config: EngineConfig,
    registry: HeuristicRegistry,
    cancel: CancelToken,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Create an engine from a validated configuration.
    ///
    /// Fails with a `ConfigError` before touching any file.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let registry = HeuristicRegistry::from_kinds(&config.heuristics);
        Ok(Self {
            config,
            registry,
            cancel: CancelToken::new(),
        })
    }

    /// A token that cancels this run when triggered.
    ///
    /// Cancellation stops dispatch of new files; in-flight files finish
    /// and the report is marked as cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run without progress events
    pub fn run(&self) -> Result<Report> {
        self.run_with_events(&null_sender())
    }

    /// Run with progress events
    pub fn run_with_events(&self, events: &EventSender) -> Result<Report> {
        let start = Instant::now();

        events.send(Event::Engine(EngineEvent::Started));
        tracing::info!(
            workers = self.config.workers,
            mode = ?self.config.mode,
            heuristics = self.registry.len(),
            "starting run"
        );

        let walker = FileWalker::new(self.config.scan.clone());
        let outcome = walker.enumerate(&self.config.sources, events);

        for error in &outcome.errors {
            tracing::warn!(error = %error, "enumeration error, continuing");
        }

        let files = outcome.files;
        if files.is_empty() {
            let report = Report::empty(start.elapsed().as_millis() as u64);
            events.send(Event::Engine(EngineEvent::Completed {
                summary: report.summary,
                duration_ms: report.duration_ms,
            }));
            return Ok(report);
        }

        tracing::info!(total = files.len(), "enumerated source files");

        let total = files.len();
        let completed = AtomicUsize::new(0);
        let mut aggregator = Aggregator::new(&files);

        let results = pool::run(
            files,
            self.config.workers,
            &self.cancel,
            self.config.timeout,
            |file| {
                events.send(Event::File(FileEvent::Started {
                    path: file.path.clone(),
                }));

                let result = sanitizer::process(file, &self.config, &self.registry);

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::File(FileEvent::Progress(FileProgress {
                    completed: done,
                    total,
                    current_path: file.path.clone(),
                })));

                if result.action == Action::Failed {
                    let message = result
                        .error
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    tracing::warn!(path = %file.path.display(), error = %message, "file failed");
                    events.send(Event::File(FileEvent::Failed {
                        path: file.path.clone(),
                        message,
                    }));
                } else {
                    events.send(Event::File(FileEvent::Completed {
                        path: file.path.clone(),
                        action: result.action,
                    }));
                }

                result
            },
        );

        for (index, result) in results {
            aggregator.insert(index, result);
        }

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            events.send(Event::Engine(EngineEvent::Cancelling));
            tracing::info!("run cancelled, in-flight files finished");
        }

        let report = aggregator.finish(cancelled, start.elapsed().as_millis() as u64)?;

        events.send(Event::Engine(EngineEvent::Completed {
            summary: report.summary,
            duration_ms: report.duration_ms,
        }));

        Ok(report)
    }
}
