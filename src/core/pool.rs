//! # Worker Pool Module
//!
//! Fixed-size pool of worker threads pulling files from a shared queue.
//!
//! ## Design
//! Fan-out is a bounded crossbeam channel of jobs; fan-in is a second
//! channel of `(input index, FileResult)` pairs. Workers share nothing
//! else, so there is no mutable state to contend over and a slow file
//! never blocks anything but its own worker.
//!
//! ## Cancellation
//! A [`CancelToken`] stops dispatch: files already handed to a worker are
//! allowed to finish, files never dispatched come back as `Skipped` with
//! a cancellation note. Every input still yields exactly one result.
//!
//! ## Timeout
//! The optional per-file timeout is cooperative: a worker measures how
//! long processing took and replaces an over-deadline result with
//! `Failed(Timeout)`. No worker is ever killed.

use crate::core::finding::{Action, FileResult};
use crate::core::scanner::SourceFile;
use crate::error::FileError;
use crossbeam_channel::{bounded, unbounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation signal, cheap to clone and share.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Dispatch `files` across `workers` threads and collect one result per
/// input, in completion order.
///
/// The returned pairs carry the original input index so the aggregator
/// can restore enumeration order.
pub fn run<F>(
    files: Vec<SourceFile>,
    workers: usize,
    cancel: &CancelToken,
    timeout: Option<Duration>,
    process: F,
) -> Vec<(usize, FileResult)>
where
    F: Fn(&SourceFile) -> FileResult + Sync,
{
    // Validation raises a ConfigError for 0 before we get here; the
    // clamp keeps the pool safe regardless
    let workers = workers.max(1);

    let (job_tx, job_rx) = bounded::<(usize, SourceFile)>(workers * 2);
    let (result_tx, result_rx) = unbounded::<(usize, FileResult)>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let process = &process;

            scope.spawn(move || {
                for (idx, file) in job_rx.iter() {
                    let started = Instant::now();
                    let mut result = process(&file);

                    if let Some(limit) = timeout {
                        if started.elapsed() > limit {
                            result = timed_out(result, limit);
                        }
                    }

                    let _ = result_tx.send((idx, result));
                }
            });
        }
        drop(job_rx);

        for (idx, file) in files.into_iter().enumerate() {
            if cancel.is_cancelled() {
                let _ = result_tx.send((
                    idx,
                    FileResult::skipped(file.path, "run cancelled before this file was dispatched"),
                ));
            } else if job_tx.send((idx, file)).is_err() {
                break;
            }
        }
        drop(job_tx);
        drop(result_tx);

        result_rx.iter().collect()
    })
}

/// Replace an over-deadline result, keeping whatever was detected.
///
/// The deadline can expire after the destination write already
/// succeeded; that copy is real, so the result notes it instead of
/// silently denying it.
fn timed_out(result: FileResult, limit: Duration) -> FileResult {
    let mut notes = result.notes;
    if result.action == Action::Stripped {
        if let Some(dest) = &result.dest {
            notes.push(format!(
                "sanitized copy was written to {} before the deadline expired",
                dest.display()
            ));
        }
    }

    FileResult::failed(
        result.source,
        result.findings,
        FileError::Timeout {
            limit_ms: limit.as_millis() as u64,
        },
        notes,
    )
}
