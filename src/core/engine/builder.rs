//! Builder for the sanitization engine.

use super::{Engine, EngineConfig, Mode};
use crate::core::heuristics::HeuristicKind;
use crate::error::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Fluent construction of an [`Engine`].
///
/// `build()` validates the assembled configuration, so an invalid worker
/// count or a missing destination fails here, before any file is touched.
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Set the source roots (directories or single files)
    pub fn sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.config.sources = sources;
        self
    }

    /// Set the run mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the destination root for sanitize mode
    pub fn dest(mut self, dest: PathBuf) -> Self {
        self.config.dest = Some(dest);
        self
    }

    /// Set the worker count
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the enabled heuristics
    pub fn heuristics(mut self, heuristics: Vec<HeuristicKind>) -> Self {
        self.config.heuristics = heuristics;
        self
    }

    /// Set an optional per-file timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace existing destination files instead of skipping them
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Include hidden files and directories
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan.include_hidden = include;
        self
    }

    /// Follow symbolic links during enumeration
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan.follow_symlinks = follow;
        self
    }

    /// Validate and build the engine
    pub fn build(self) -> Result<Engine> {
        Engine::new(self.config)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
