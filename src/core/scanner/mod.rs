//! # Scanner Module
//!
//! Enumerates the files a run will process.
//!
//! ## Enumeration Order
//! The order produced here is the order of the final report. Sources are
//! visited in the order given; within a directory source, files are
//! sorted by path so the same tree always enumerates the same way,
//! independent of filesystem iteration order.
//!
//! Every regular file is enumerated, images or not - the sanitizer skips
//! unsupported formats with an explicit note, so nothing is silently
//! dropped from the report.

mod filter;
mod walker;

pub use filter::FileFilter;
pub use walker::{FileWalker, ScanConfig};

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One enumerated input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Absolute (or caller-relative) path of the file
    pub path: PathBuf,
    /// Path relative to its source root, used to mirror the tree under
    /// the destination. For a file given directly as a source this is
    /// just its file name.
    pub rel: PathBuf,
    /// Format detected from the extension
    pub format: ImageFormat,
}

/// Image formats the sanitizer can decode and re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
    Unknown,
}

impl ImageFormat {
    /// Detect format from a file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            "gif" => ImageFormat::Gif,
            "bmp" => ImageFormat::Bmp,
            "tiff" | "tif" => ImageFormat::Tiff,
            _ => ImageFormat::Unknown,
        }
    }

    /// Check if this format is supported for sanitization
    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Result of an enumeration pass
#[derive(Debug)]
pub struct ScanOutcome {
    /// Enumerated files, in final report order
    pub files: Vec<SourceFile>,
    /// Errors that occurred during enumeration (non-fatal)
    pub errors: Vec<ScanError>,
}
