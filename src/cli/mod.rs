//! # CLI Module
//!
//! Command-line interface for the image sanitizer.
//!
//! ## Usage
//! ```bash
//! # Write sanitized copies, mirroring the source tree
//! img-scrub sanitize ~/Photos --dest ~/Sanitized
//!
//! # Detect only, never write
//! img-scrub report ~/Photos
//!
//! # More workers, JSON output
//! img-scrub sanitize ~/Photos --dest ~/Sanitized --workers 8 --output json
//! ```
//!
//! The CLI validates flags, builds an `EngineConfig`, runs the engine,
//! and renders the finished report. All formatting lives here; the
//! engine itself never prints.

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_sanitizer::core::engine::{Engine, Mode};
use image_sanitizer::core::finding::Action;
use image_sanitizer::core::heuristics::HeuristicKind;
use image_sanitizer::core::report::Report;
use image_sanitizer::error::Result;
use image_sanitizer::events::{EngineEvent, Event, EventChannel, FileEvent, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Image Sanitizer - strip sensitive metadata without touching originals
#[derive(Parser, Debug)]
#[command(name = "img-scrub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect sensitive metadata and write sanitized copies
    Sanitize {
        /// Source directories or files
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Destination root for sanitized copies
        #[arg(short, long, required = true)]
        dest: PathBuf,

        #[command(flatten)]
        common: CommonArgs,

        /// Replace existing destination files instead of skipping them
        #[arg(long)]
        overwrite: bool,
    },

    /// Detect sensitive metadata without writing anything
    Report {
        /// Source directories or files
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Number of worker threads
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Content heuristics to run (default: all)
    #[arg(long, value_delimiter = ',')]
    heuristics: Option<Vec<HeuristicKind>>,

    /// Per-file timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output (per-file detail)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (action and path per line)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    image_sanitizer::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sanitize {
            sources,
            dest,
            common,
            overwrite,
        } => run_engine(sources, Mode::Sanitize, Some(dest), overwrite, common),
        Commands::Report { sources, common } => {
            run_engine(sources, Mode::ReportOnly, None, false, common)
        }
    }
}

fn run_engine(
    sources: Vec<PathBuf>,
    mode: Mode,
    dest: Option<PathBuf>,
    overwrite: bool,
    common: CommonArgs,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(common.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Image Sanitizer").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut builder = Engine::builder()
        .sources(sources)
        .mode(mode)
        .workers(common.workers)
        .overwrite(overwrite)
        .include_hidden(common.include_hidden)
        .timeout(common.timeout_secs.map(Duration::from_secs));

    if let Some(dest) = dest {
        builder = builder.dest(dest);
    }
    if let Some(heuristics) = common.heuristics {
        builder = builder.heuristics(heuristics);
    }

    let engine = builder.build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(common.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = common.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                        pb.set_message("processing");
                    }
                }
                Event::File(FileEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        if verbose {
                            pb.set_message(
                                p.current_path
                                    .file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy()
                                    .to_string(),
                            );
                        }
                    }
                }
                Event::Engine(EngineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let report = engine.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let report = report?;

    match common.output {
        OutputFormat::Pretty => print_pretty_report(&term, &report, verbose),
        OutputFormat::Json => print_json_report(&report),
        OutputFormat::Minimal => print_minimal_report(&report),
    }

    Ok(())
}

fn print_pretty_report(term: &Term, report: &Report, verbose: bool) {
    term.write_line("").ok();

    if report.cancelled {
        term.write_line(&format!(
            "{} Run cancelled early - partial results below",
            style("!").yellow().bold()
        ))
        .ok();
    } else {
        term.write_line(&format!("{} Run complete", style("✓").green().bold()))
            .ok();
    }
    term.write_line("").ok();

    let s = &report.summary;
    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(s.scanned).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} stripped, {} recorded, {} skipped, {} failed",
        style(s.stripped).green(),
        style(s.recorded).cyan(),
        style(s.skipped).yellow(),
        style(s.failed).red()
    ))
    .ok();
    term.write_line("").ok();

    for result in &report.results {
        let interesting = result.action == Action::Failed || !result.findings.is_empty();
        if !verbose && !interesting {
            continue;
        }

        let marker = match result.action {
            Action::Stripped => style("stripped").green(),
            Action::RecordedOnly => style("recorded").cyan(),
            Action::Skipped => style("skipped ").yellow(),
            Action::Failed => style("failed  ").red(),
        };

        term.write_line(&format!("  {} {}", marker, result.source.display()))
            .ok();

        if let Some(error) = &result.error {
            term.write_line(&format!("      {}", style(error).red())).ok();
        }

        if verbose {
            for finding in &result.findings {
                term.write_line(&format!(
                    "      {:?}/{}: {}",
                    finding.category, finding.tag, finding.value
                ))
                .ok();
            }
            for note in &result.notes {
                term.write_line(&format!("      {}", style(note).dim())).ok();
            }
        } else {
            let sensitive = result.sensitive_count();
            if sensitive > 0 {
                term.write_line(&format!(
                    "      {} sensitive finding(s)",
                    style(sensitive).red()
                ))
                .ok();
            }
        }
    }
}

fn print_json_report(report: &Report) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize report: {}", e),
    }
}

fn print_minimal_report(report: &Report) {
    for result in &report.results {
        let action = match result.action {
            Action::Stripped => "stripped",
            Action::RecordedOnly => "recorded",
            Action::Skipped => "skipped",
            Action::Failed => "failed",
        };
        println!("{}\t{}", action, result.source.display());
    }
}
