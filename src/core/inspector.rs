//! # Inspector Module
//!
//! Reads embedded EXIF metadata and classifies each entry.
//!
//! ## Classification
//! - GPS IFD entries -> `ExifGps`
//! - Camera, lens, owner and software identification -> `ExifDevice`
//! - Capture/digitization timestamps -> `ExifTimestamp`
//! - Thumbnail IFD entries -> `Thumbnail`
//! - Everything else -> `Custom` (informational)
//!
//! The inspector never mutates the file. Findings come back in the order
//! the EXIF container stores them, so reports are reproducible.

use crate::core::finding::{Category, Finding};
use crate::error::FileError;
use exif::{Context, In, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Longest rendered value kept in a finding. MakerNote blobs can be
/// kilobytes of raw bytes.
const MAX_VALUE_LEN: usize = 120;

/// A loaded image handle: the source path plus its parsed EXIF container,
/// if one is present.
///
/// Parsed once per file and shared between the inspector and the
/// heuristics, so detection reads each file a single time.
pub struct ImageMeta {
    pub path: PathBuf,
    pub exif: Option<exif::Exif>,
}

impl std::fmt::Debug for ImageMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageMeta")
            .field("path", &self.path)
            .field("exif", &self.exif.as_ref().map(|_| "Exif"))
            .finish()
    }
}

impl ImageMeta {
    /// Open a file and parse its EXIF container.
    ///
    /// A file without EXIF (or with a container the parser does not
    /// recognize) is a valid, empty handle - only an unreadable file is
    /// an error.
    pub fn load(path: &Path) -> Result<Self, FileError> {
        let file = File::open(path).map_err(|e| FileError::Decode {
            reason: e.to_string(),
        })?;

        let mut reader = BufReader::new(file);
        let exif = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Some(exif),
            Err(exif::Error::Io(e)) => {
                return Err(FileError::Decode {
                    reason: e.to_string(),
                })
            }
            // No EXIF is not a failure
            Err(_) => None,
        };

        Ok(Self {
            path: path.to_path_buf(),
            exif,
        })
    }
}

/// Read all metadata entries from an image handle.
///
/// Returns one finding per EXIF field, classified per the fixed rule set.
/// Order matches the container's field order.
pub fn inspect(meta: &ImageMeta) -> Vec<Finding> {
    let Some(exif) = &meta.exif else {
        return Vec::new();
    };

    exif.fields()
        .map(|field| {
            let category = classify(field.tag, field.ifd_num);
            let tag = if field.ifd_num == In::THUMBNAIL {
                format!("Thumbnail/{}", field.tag)
            } else {
                field.tag.to_string()
            };
            Finding::new(tag, category, render_value(field))
        })
        .collect()
}

/// The fixed tag classification rule set.
fn classify(tag: Tag, ifd: In) -> Category {
    if ifd == In::THUMBNAIL {
        return Category::Thumbnail;
    }

    if tag.context() == Context::Gps {
        return Category::ExifGps;
    }

    match tag {
        Tag::Make
        | Tag::Model
        | Tag::Software
        | Tag::Artist
        | Tag::Copyright
        | Tag::LensMake
        | Tag::LensModel
        | Tag::LensSerialNumber
        | Tag::BodySerialNumber
        | Tag::CameraOwnerName => Category::ExifDevice,

        Tag::DateTime
        | Tag::DateTimeOriginal
        | Tag::DateTimeDigitized
        | Tag::SubSecTime
        | Tag::SubSecTimeOriginal
        | Tag::SubSecTimeDigitized => Category::ExifTimestamp,

        _ => Category::Custom,
    }
}

fn render_value(field: &exif::Field) -> String {
    let rendered = field.display_value().to_string();
    if rendered.len() > MAX_VALUE_LEN {
        let cut = rendered
            .char_indices()
            .take_while(|(i, _)| *i < MAX_VALUE_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}... ({} bytes)", &rendered[..cut], rendered.len())
    } else {
        rendered
    }
}
