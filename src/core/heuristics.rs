//! # Heuristics Module
//!
//! Pluggable content heuristics that add findings beyond plain tag
//! enumeration.
//!
//! ## Isolation
//! Heuristic quality varies, so each one runs isolated: an error from one
//! heuristic is logged, recorded as a note on the file, and never aborts
//! the other heuristics or fails the file. This keeps a flaky heuristic
//! from destabilizing the whole pipeline.
//!
//! ## Built-in heuristics
//! - `gps-precision` - GPS coordinates stored with higher-than-street
//!   precision (sub-arcsecond rationals)
//! - `embedded-thumbnail` - a thumbnail IFD carrying a preview image
//! - `maker-note` - a vendor-specific MakerNote blob, which can hide
//!   serial numbers and positioning data in undocumented layouts
//!
//! Heuristic signals are informational (`Category::Custom`), with one
//! exception: `embedded-thumbnail` reports `Category::Thumbnail`, since
//! the preview it flags is image content, sensitive in the same way as
//! the thumbnail-IFD tags themselves.

use crate::core::finding::{Category, Finding};
use crate::core::inspector::ImageMeta;
use crate::error::HeuristicError;
use clap::ValueEnum;
use exif::{In, Tag, Value};
use serde::{Deserialize, Serialize};

/// A single content heuristic.
///
/// Implementations must be pure with respect to the image: they read the
/// handle, they never modify it.
pub trait Heuristic: Send + Sync {
    /// Stable identifier, used in finding tags and notes
    fn id(&self) -> &'static str;

    /// Run against one image handle.
    ///
    /// `Ok(None)` means the heuristic did not trigger. `Err` marks the
    /// heuristic as degraded for this file; the caller isolates it.
    fn run(&self, meta: &ImageMeta) -> Result<Option<Finding>, HeuristicError>;
}

/// The built-in heuristics, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum HeuristicKind {
    /// Flag GPS coordinates with suspiciously high precision
    GpsPrecision,
    /// Flag an embedded thumbnail/preview image
    EmbeddedThumbnail,
    /// Flag a vendor-specific MakerNote blob
    MakerNote,
}

impl HeuristicKind {
    fn instantiate(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::GpsPrecision => Box::new(GpsPrecision),
            HeuristicKind::EmbeddedThumbnail => Box::new(EmbeddedThumbnail),
            HeuristicKind::MakerNote => Box::new(MakerNote),
        }
    }
}

/// Findings and degradation notes from one scan pass
#[derive(Debug, Default)]
pub struct ScanFindings {
    pub findings: Vec<Finding>,
    pub notes: Vec<String>,
}

/// The set of heuristics enabled for a run, fixed at configuration time.
pub struct HeuristicRegistry {
    entries: Vec<Box<dyn Heuristic>>,
}

impl HeuristicRegistry {
    /// Build a registry from the configured kinds
    pub fn from_kinds(kinds: &[HeuristicKind]) -> Self {
        Self {
            entries: kinds.iter().map(|k| k.instantiate()).collect(),
        }
    }

    /// Build a registry with every built-in heuristic enabled
    pub fn all() -> Self {
        Self::from_kinds(&[
            HeuristicKind::GpsPrecision,
            HeuristicKind::EmbeddedThumbnail,
            HeuristicKind::MakerNote,
        ])
    }

    #[cfg(test)]
    pub(crate) fn from_boxed(entries: Vec<Box<dyn Heuristic>>) -> Self {
        Self { entries }
    }

    /// Number of enabled heuristics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every enabled heuristic against one image handle.
    ///
    /// Failures are isolated per heuristic: logged, turned into a note,
    /// and the remaining heuristics still run.
    pub fn scan(&self, meta: &ImageMeta) -> ScanFindings {
        let mut out = ScanFindings::default();

        for heuristic in &self.entries {
            match heuristic.run(meta) {
                Ok(Some(finding)) => out.findings.push(finding),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        heuristic = heuristic.id(),
                        path = %meta.path.display(),
                        error = %e,
                        "heuristic degraded, continuing"
                    );
                    out.notes.push(format!("heuristic degraded: {}", e));
                }
            }
        }

        out
    }
}

/// Denominators above this on the seconds component mean the coordinate
/// resolves to well under a metre.
const SUB_ARCSECOND_DENOM: u32 = 100;

struct GpsPrecision;

impl Heuristic for GpsPrecision {
    fn id(&self) -> &'static str {
        "gps-precision"
    }

    fn run(&self, meta: &ImageMeta) -> Result<Option<Finding>, HeuristicError> {
        let Some(exif) = &meta.exif else {
            return Ok(None);
        };
        let Some(field) = exif.get_field(Tag::GPSLatitude, In::PRIMARY) else {
            return Ok(None);
        };

        let Value::Rational(parts) = &field.value else {
            return Err(HeuristicError {
                id: self.id().to_string(),
                reason: "GPSLatitude is not a rational value".to_string(),
            });
        };

        if parts.len() != 3 {
            return Err(HeuristicError {
                id: self.id().to_string(),
                reason: format!("expected degree/minute/second triple, got {} parts", parts.len()),
            });
        }

        let seconds = parts[2];
        if seconds.denom > SUB_ARCSECOND_DENOM {
            return Ok(Some(Finding::new(
                "heuristic:gps-precision",
                Category::Custom,
                format!(
                    "coordinates stored at sub-arcsecond precision ({}/{}\")",
                    seconds.num, seconds.denom
                ),
            )));
        }

        Ok(None)
    }
}

struct EmbeddedThumbnail;

impl Heuristic for EmbeddedThumbnail {
    fn id(&self) -> &'static str {
        "embedded-thumbnail"
    }

    fn run(&self, meta: &ImageMeta) -> Result<Option<Finding>, HeuristicError> {
        let Some(exif) = &meta.exif else {
            return Ok(None);
        };

        let fields = exif.fields().filter(|f| f.ifd_num == In::THUMBNAIL).count();
        if fields == 0 {
            return Ok(None);
        }

        Ok(Some(Finding::new(
            "heuristic:embedded-thumbnail",
            Category::Thumbnail,
            format!("embedded preview present ({} thumbnail fields)", fields),
        )))
    }
}

struct MakerNote;

impl Heuristic for MakerNote {
    fn id(&self) -> &'static str {
        "maker-note"
    }

    fn run(&self, meta: &ImageMeta) -> Result<Option<Finding>, HeuristicError> {
        let Some(exif) = &meta.exif else {
            return Ok(None);
        };
        let Some(field) = exif.get_field(Tag::MakerNote, In::PRIMARY) else {
            return Ok(None);
        };

        let size = match &field.value {
            Value::Undefined(bytes, _) => bytes.len(),
            Value::Byte(bytes) => bytes.len(),
            other => {
                return Err(HeuristicError {
                    id: self.id().to_string(),
                    reason: format!("unexpected MakerNote value type: {:?}", other),
                })
            }
        };

        Ok(Some(Finding::new(
            "heuristic:maker-note",
            Category::Custom,
            format!("vendor MakerNote blob present ({} bytes)", size),
        )))
    }
}
