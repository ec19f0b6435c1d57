//! Directory walking implementation using walkdir.

use super::{filter::FileFilter, ScanOutcome, SourceFile};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for the file walker
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

/// Enumerates source files using the walkdir crate
pub struct FileWalker {
    config: ScanConfig,
    filter: FileFilter,
}

impl FileWalker {
    /// Create a new walker with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = FileFilter::new().with_hidden(config.include_hidden);
        Self { config, filter }
    }

    /// Enumerate all files under the given sources.
    ///
    /// Each source may be a directory (walked recursively, files sorted
    /// by path) or a single file. A missing source is recorded as an
    /// error, not a panic; enumeration continues with the next source.
    pub fn enumerate(&self, sources: &[PathBuf], events: &EventSender) -> ScanOutcome {
        let mut files = Vec::new();
        let mut errors = Vec::new();

        events.send(Event::Scan(ScanEvent::Started {
            sources: sources.to_vec(),
        }));

        for source in sources {
            if source.is_file() {
                let rel = source
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| source.clone());
                self.push_file(source.clone(), rel, &mut files, events);
            } else if source.is_dir() {
                self.walk_directory(source, &mut files, &mut errors, events);
            } else {
                errors.push(ScanError::SourceNotFound {
                    path: source.clone(),
                });
                events.send(Event::Scan(ScanEvent::Error {
                    path: source.clone(),
                    message: "source not found".to_string(),
                }));
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        ScanOutcome { files, errors }
    }

    fn walk_directory(
        &self,
        root: &Path,
        files: &mut Vec<SourceFile>,
        errors: &mut Vec<ScanError>,
        events: &EventSender,
    ) {
        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        // Hidden entries are pruned during the walk, so a hidden
        // directory's contents never surface. The root itself is exempt:
        // an explicitly given hidden source directory is still walked.
        let include_hidden = self.config.include_hidden;
        let iter = walker.into_iter().filter_entry(move |entry| {
            include_hidden
                || entry.depth() == 0
                || entry
                    .file_name()
                    .to_str()
                    .map(|name| !name.starts_with('.'))
                    .unwrap_or(true)
        });

        let mut found = Vec::new();

        for entry_result in iter {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path.is_dir() {
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    let rel = path
                        .strip_prefix(root)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| {
                            path.file_name()
                                .map(PathBuf::from)
                                .unwrap_or_else(|| path.to_path_buf())
                        });

                    found.push((path.to_path_buf(), rel));
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: e
                                .into_io_error()
                                .unwrap_or_else(|| std::io::Error::other("walk error")),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    errors.push(error);
                }
            }
        }

        // Report order must not depend on filesystem iteration order
        found.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, rel) in found {
            self.push_file(path, rel, files, events);
        }
    }

    fn push_file(
        &self,
        path: PathBuf,
        rel: PathBuf,
        files: &mut Vec<SourceFile>,
        events: &EventSender,
    ) {
        let format = self.filter.get_format(&path);

        events.send(Event::Scan(ScanEvent::FileFound { path: path.clone() }));

        files.push(SourceFile { path, rel, format });
    }
}
