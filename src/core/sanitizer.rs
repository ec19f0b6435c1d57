//! # Sanitizer Module
//!
//! The per-file algorithm: detect, classify, and (in sanitize mode) write
//! a metadata-free copy.
//!
//! ## Stripping strategy
//! The copy is produced by decoding the pixels and re-encoding them at
//! the mirrored destination path. Re-encoding drops every container
//! metadata segment at once, which removes all sensitive findings in one
//! step and makes a second pass over the output a no-op. Two pieces of
//! the source carry over so the copy still renders the same: orientation
//! is baked into the pixels, and the ICC color profile is re-attached to
//! the encoded copy where the encoder supports one.
//!
//! Sources are never modified in place.

use crate::core::engine::{EngineConfig, Mode};
use crate::core::finding::{FileResult, Finding};
use crate::core::heuristics::HeuristicRegistry;
use crate::core::inspector::{self, ImageMeta};
use crate::core::scanner::SourceFile;
use crate::error::FileError;
use exif::{In, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Process one file and build its complete result.
///
/// Detection (EXIF inspection plus heuristics) is identical in both
/// modes; only the write step depends on the mode. The destination write
/// is the only side effect.
pub fn process(
    file: &SourceFile,
    config: &EngineConfig,
    registry: &HeuristicRegistry,
) -> FileResult {
    if !file.format.is_supported() {
        return FileResult::skipped(
            file.path.clone(),
            format!("unsupported format: {}", extension_of(&file.path)),
        );
    }

    let meta = match ImageMeta::load(&file.path) {
        Ok(meta) => meta,
        Err(e) => return FileResult::failed(file.path.clone(), Vec::new(), e, Vec::new()),
    };

    let (findings, mut notes) = detect(&meta, registry);

    match config.mode {
        Mode::ReportOnly => {
            // Still verify the file decodes, so a corrupt image reports
            // Failed in both modes
            if let Err(e) = probe_decode(&file.path) {
                return FileResult::failed(file.path.clone(), findings, e, notes);
            }
            FileResult::recorded(file.path.clone(), findings, notes)
        }
        Mode::Sanitize => {
            let Some(dest_root) = config.dest.as_deref() else {
                // Validation rejects this before any work starts
                return FileResult::failed(
                    file.path.clone(),
                    findings,
                    FileError::Write {
                        reason: "no destination directory configured".to_string(),
                    },
                    notes,
                );
            };

            let dest_path = dest_root.join(&file.rel);

            if !config.overwrite && dest_path.exists() {
                return FileResult::skipped(
                    file.path.clone(),
                    format!("destination already exists: {}", dest_path.display()),
                );
            }

            match write_stripped(&file.path, &dest_path, &meta) {
                Ok(()) => FileResult::stripped(file.path.clone(), dest_path, findings, notes),
                Err(e) => {
                    // Partial-failure semantics: detection succeeded,
                    // persistence did not - findings stay in the report
                    notes.push("findings detected but no copy was written".to_string());
                    FileResult::failed(file.path.clone(), findings, e, notes)
                }
            }
        }
    }
}

/// Run the inspector and the heuristics, then union the findings.
///
/// Dedup is by tag identifier; on a conflict the inspector's finding
/// wins. Order is stable: inspector findings first, in container order,
/// then heuristic findings in registry order.
fn detect(meta: &ImageMeta, registry: &HeuristicRegistry) -> (Vec<Finding>, Vec<String>) {
    let mut findings = inspector::inspect(meta);
    let scan = registry.scan(meta);

    let mut seen: HashSet<String> = findings.iter().map(|f| f.tag.clone()).collect();
    for finding in scan.findings {
        if seen.insert(finding.tag.clone()) {
            findings.push(finding);
        }
    }

    (findings, scan.notes)
}

/// Verify a file decodes without producing pixels.
///
/// Used in report-only mode, where nothing is written but a corrupt
/// image must still be reported as failed.
fn probe_decode(path: &Path) -> Result<(), FileError> {
    ImageReader::open(path)
        .map_err(decode_err)?
        .with_guessed_format()
        .map_err(decode_err)?
        .into_dimensions()
        .map_err(decode_err)?;
    Ok(())
}

/// Decode the source, bake in orientation, and re-encode at `dest`,
/// carrying the source's ICC color profile across.
fn write_stripped(source: &Path, dest: &Path, meta: &ImageMeta) -> Result<(), FileError> {
    let reader = ImageReader::open(source)
        .map_err(decode_err)?
        .with_guessed_format()
        .map_err(decode_err)?;

    let mut decoder = reader.into_decoder().map_err(decode_err)?;
    let icc = decoder.icc_profile().ok().flatten();
    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_err)?;

    if let Some(orientation) = exif_orientation(meta) {
        img.apply_orientation(orientation);
    }

    if let Some(parent) = dest.parent() {
        // Racing workers may create the same parent; create_dir_all is
        // idempotent so both succeed
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    save_with_profile(&img, dest, icc)
}

/// Encode `img` at `dest`. A color-managed source keeps its profile in
/// the copy; only the JPEG and PNG encoders can carry one, other
/// formats fall back to a plain save.
fn save_with_profile(img: &DynamicImage, dest: &Path, icc: Option<Vec<u8>>) -> Result<(), FileError> {
    if let Some(icc) = icc {
        match ImageFormat::from_path(dest) {
            Ok(ImageFormat::Jpeg) => {
                let mut writer = BufWriter::new(File::create(dest).map_err(write_err)?);
                let mut encoder = JpegEncoder::new(&mut writer);
                attach_profile(&mut encoder, icc, dest);
                img.write_with_encoder(encoder).map_err(write_err)?;
                return writer.flush().map_err(write_err);
            }
            Ok(ImageFormat::Png) => {
                let mut writer = BufWriter::new(File::create(dest).map_err(write_err)?);
                let mut encoder = PngEncoder::new(&mut writer);
                attach_profile(&mut encoder, icc, dest);
                img.write_with_encoder(encoder).map_err(write_err)?;
                return writer.flush().map_err(write_err);
            }
            _ => {
                tracing::debug!(
                    path = %dest.display(),
                    "target format cannot carry an ICC profile, dropping it"
                );
            }
        }
    }

    img.save(dest).map_err(write_err)
}

fn attach_profile<E: image::ImageEncoder>(encoder: &mut E, icc: Vec<u8>, dest: &Path) {
    // A rejected profile is not fatal; the copy is still written
    if let Err(e) = encoder.set_icc_profile(icc) {
        tracing::debug!(path = %dest.display(), error = %e, "encoder rejected ICC profile");
    }
}

fn decode_err(e: impl std::fmt::Display) -> FileError {
    FileError::Decode {
        reason: e.to_string(),
    }
}

fn write_err(e: impl std::fmt::Display) -> FileError {
    FileError::Write {
        reason: e.to_string(),
    }
}

fn exif_orientation(meta: &ImageMeta) -> Option<Orientation> {
    let exif = meta.exif.as_ref()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    let raw = field.value.get_uint(0)?;
    Orientation::from_exif(u8::try_from(raw).ok()?)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_else(|| "no extension".to_string())
}
