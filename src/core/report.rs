//! # Report Module
//!
//! Merges per-file results into the final report.
//!
//! ## Ordering
//! Workers complete out of order. The aggregator owns a slot per input
//! and files each result back into its enumeration position, so the
//! final report reads the same for any worker count - reproducible and
//! diff-friendly across runs.
//!
//! The report is only observable through [`Aggregator::finish`], once
//! every expected result is in. No partial report leaks mid-run.

use crate::core::finding::{Action, FileResult};
use crate::core::scanner::SourceFile;
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary counters over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Total files enumerated and processed
    pub scanned: usize,
    /// Sanitized copies written
    pub stripped: usize,
    /// Findings recorded without writing (report-only mode)
    pub recorded: usize,
    /// Files deliberately left alone
    pub skipped: usize,
    /// Files that failed decode, write, or timed out
    pub failed: usize,
}

/// The finalized outcome of a run.
///
/// `results` is in input enumeration order. Read-only once handed to the
/// caller; the engine performs no formatting or printing itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct Report {
    pub results: Vec<FileResult>,
    pub summary: Summary,
    /// True when the run was cancelled before every file was dispatched
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl Report {
    /// A report for a run that found nothing to do
    pub fn empty(duration_ms: u64) -> Self {
        Self {
            results: Vec::new(),
            summary: Summary::default(),
            cancelled: false,
            duration_ms,
        }
    }
}

/// Collects completion-ordered results and restores enumeration order.
pub struct Aggregator {
    /// One slot per enumerated input, indexed by enumeration position
    slots: Vec<Option<FileResult>>,
    /// Expected source paths, for diagnostics when a slot stays empty
    paths: Vec<PathBuf>,
    summary: Summary,
}

impl Aggregator {
    /// Create an aggregator expecting one result per enumerated file
    pub fn new(files: &[SourceFile]) -> Self {
        Self {
            slots: files.iter().map(|_| None).collect(),
            paths: files.iter().map(|f| f.path.clone()).collect(),
            summary: Summary::default(),
        }
    }

    /// File one result into its enumeration slot, updating counters.
    ///
    /// An index outside the expected range or a double insert indicates a
    /// pool bug; it is logged and ignored rather than corrupting the
    /// report.
    pub fn insert(&mut self, index: usize, result: FileResult) {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::warn!(index, "result index out of range, dropping");
            return;
        };
        if slot.is_some() {
            tracing::warn!(index, "duplicate result for input, dropping");
            return;
        }

        self.summary.scanned += 1;
        match result.action {
            Action::Stripped => self.summary.stripped += 1,
            Action::RecordedOnly => self.summary.recorded += 1,
            Action::Skipped => self.summary.skipped += 1,
            Action::Failed => self.summary.failed += 1,
        }

        *slot = Some(result);
    }

    /// True once every expected result has been inserted
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Finalize into a read-only report.
    ///
    /// Fails if any input is missing a result - the engine's invariant is
    /// that no file is silently dropped, so a hole is an error, not a
    /// shrug.
    pub fn finish(self, cancelled: bool, duration_ms: u64) -> Result<Report, ReportError> {
        let mut results = Vec::with_capacity(self.slots.len());

        for (index, slot) in self.slots.into_iter().enumerate() {
            match slot {
                Some(result) => results.push(result),
                None => {
                    return Err(ReportError::MissingResult {
                        index,
                        path: self.paths.get(index).cloned().unwrap_or_default(),
                    })
                }
            }
        }

        Ok(Report {
            results,
            summary: self.summary,
            cancelled,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ImageFormat;

    fn fake_files(n: usize) -> Vec<SourceFile> {
        (0..n)
            .map(|i| SourceFile {
                path: PathBuf::from(format!("/photos/{i:03}.jpg")),
                rel: PathBuf::from(format!("{i:03}.jpg")),
                format: ImageFormat::Jpeg,
            })
            .collect()
    }

    fn recorded(path: &str) -> FileResult {
        FileResult::recorded(PathBuf::from(path), Vec::new(), Vec::new())
    }

    #[test]
    fn restores_enumeration_order() {
        let files = fake_files(3);
        let mut agg = Aggregator::new(&files);

        // Completion order: 2, 0, 1
        agg.insert(2, recorded("/photos/002.jpg"));
        agg.insert(0, recorded("/photos/000.jpg"));
        agg.insert(1, recorded("/photos/001.jpg"));

        let report = agg.finish(false, 10).unwrap();
        let order: Vec<_> = report
            .results
            .iter()
            .map(|r| r.source.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            order,
            vec!["/photos/000.jpg", "/photos/001.jpg", "/photos/002.jpg"]
        );
    }

    #[test]
    fn counters_track_actions() {
        let files = fake_files(4);
        let mut agg = Aggregator::new(&files);

        agg.insert(0, recorded("/photos/000.jpg"));
        agg.insert(
            1,
            FileResult::skipped(PathBuf::from("/photos/001.jpg"), "unsupported"),
        );
        agg.insert(
            2,
            FileResult::failed(
                PathBuf::from("/photos/002.jpg"),
                Vec::new(),
                crate::error::FileError::Decode {
                    reason: "bad".to_string(),
                },
                Vec::new(),
            ),
        );
        agg.insert(
            3,
            FileResult::stripped(
                PathBuf::from("/photos/003.jpg"),
                PathBuf::from("/out/003.jpg"),
                Vec::new(),
                Vec::new(),
            ),
        );

        let report = agg.finish(false, 10).unwrap();
        assert_eq!(
            report.summary,
            Summary {
                scanned: 4,
                stripped: 1,
                recorded: 1,
                skipped: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn missing_result_is_an_error() {
        let files = fake_files(2);
        let mut agg = Aggregator::new(&files);
        agg.insert(0, recorded("/photos/000.jpg"));

        assert!(!agg.is_complete());
        let err = agg.finish(false, 10).unwrap_err();
        assert!(matches!(err, ReportError::MissingResult { index: 1, .. }));
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let files = fake_files(1);
        let mut agg = Aggregator::new(&files);
        agg.insert(0, recorded("/photos/000.jpg"));
        agg.insert(0, recorded("/photos/000.jpg"));

        let report = agg.finish(false, 10).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.summary.scanned, 1);
    }

    #[test]
    fn cancelled_flag_is_preserved() {
        let files = fake_files(1);
        let mut agg = Aggregator::new(&files);
        agg.insert(0, recorded("/photos/000.jpg"));
        let report = agg.finish(true, 10).unwrap();
        assert!(report.cancelled);
    }
}
