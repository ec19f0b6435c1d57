//! Integration tests for the sanitization engine.
//!
//! These tests verify end-to-end behavior including:
//! - One result per enumerated input, in enumeration order
//! - Determinism across worker counts
//! - Mode-independent detection and second-pass idempotence
//! - Per-file failure isolation
//! - Concurrent mirrored-directory creation

use assert_fs::prelude::*;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageReader, Rgb, RgbImage};
use image_sanitizer::core::engine::{Engine, Mode};
use image_sanitizer::core::finding::{Action, Sensitivity};
use image_sanitizer::core::report::Report;
use predicates::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Serialize a small EXIF block carrying device, timestamp and
/// high-precision GPS fields.
fn build_exif_blob() -> Vec<u8> {
    let make = Field {
        tag: Tag::Make,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![b"TestCam".to_vec()]),
    };
    let model = Field {
        tag: Tag::Model,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![b"TC-1000".to_vec()]),
    };
    let taken = Field {
        tag: Tag::DateTimeOriginal,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![b"2024:06:01 12:00:00".to_vec()]),
    };
    let lat_ref = Field {
        tag: Tag::GPSLatitudeRef,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![b"N".to_vec()]),
    };
    // Seconds with denominator 1000: sub-arcsecond precision, which the
    // gps-precision heuristic flags
    let lat = Field {
        tag: Tag::GPSLatitude,
        ifd_num: In::PRIMARY,
        value: Value::Rational(vec![
            Rational { num: 51, denom: 1 },
            Rational { num: 30, denom: 1 },
            Rational {
                num: 12_345,
                denom: 1_000,
            },
        ]),
    };

    let mut writer = Writer::new();
    writer.push_field(&make);
    writer.push_field(&model);
    writer.push_field(&taken);
    writer.push_field(&lat_ref);
    writer.push_field(&lat);

    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("serialize EXIF");
    buf.into_inner()
}

/// Write a small valid JPEG with an EXIF APP1 segment spliced in after
/// the SOI marker.
fn write_jpeg_with_exif(path: &Path) {
    let img = RgbImage::from_pixel(8, 8, Rgb([100, 150, 200]));
    let mut jpeg = Vec::new();
    img.write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .expect("encode JPEG");

    splice_exif(path, jpeg);
}

/// Same as [`write_jpeg_with_exif`], but the JPEG also carries an ICC
/// color profile.
fn write_jpeg_with_exif_and_profile(path: &Path, icc: &[u8]) {
    let img = RgbImage::from_pixel(8, 8, Rgb([100, 150, 200]));
    let mut jpeg = Vec::new();
    let mut cursor = Cursor::new(&mut jpeg);
    let mut encoder = JpegEncoder::new(&mut cursor);
    encoder
        .set_icc_profile(icc.to_vec())
        .expect("attach ICC profile");
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .expect("encode JPEG");
    drop(cursor);

    splice_exif(path, jpeg);
}

fn splice_exif(path: &Path, jpeg: Vec<u8>) {
    let blob = build_exif_blob();
    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((blob.len() + 8) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&blob);

    let mut out = Vec::with_capacity(jpeg.len() + app1.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    fs::write(path, out).expect("write JPEG");
}

fn write_plain_png(path: &Path) {
    let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
    img.save(path).expect("write PNG");
}

fn run_report(sources: Vec<PathBuf>, workers: usize) -> Report {
    Engine::builder()
        .sources(sources)
        .mode(Mode::ReportOnly)
        .workers(workers)
        .build()
        .unwrap()
        .run()
        .unwrap()
}

#[test]
fn every_input_appears_exactly_once() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write_plain_png(&dir.path().join(format!("img{i}.png")));
    }
    fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let report = run_report(vec![dir.path().to_path_buf()], 4);

    assert_eq!(report.results.len(), 6);
    assert_eq!(report.summary.scanned, 6);
    assert_eq!(report.summary.recorded, 5);
    assert_eq!(report.summary.skipped, 1);
}

#[test]
fn report_order_is_independent_of_worker_count() {
    let dir = TempDir::new().unwrap();
    for name in ["e.png", "a.png", "c.png", "b.png", "d.png"] {
        write_plain_png(&dir.path().join(name));
    }

    let baseline = run_report(vec![dir.path().to_path_buf()], 1);
    let order: Vec<PathBuf> = baseline.results.iter().map(|r| r.source.clone()).collect();

    for workers in [4, 16] {
        let report = run_report(vec![dir.path().to_path_buf()], workers);
        let got: Vec<PathBuf> = report.results.iter().map(|r| r.source.clone()).collect();
        assert_eq!(got, order, "workers = {workers}");

        for (a, b) in baseline.results.iter().zip(report.results.iter()) {
            assert_eq!(a.findings, b.findings);
            assert_eq!(a.action, b.action);
        }
    }
}

#[test]
fn exif_fields_are_detected_and_classified() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("photo.jpg");
    write_jpeg_with_exif(&photo);

    let report = run_report(vec![photo], 1);
    let result = &report.results[0];

    assert_eq!(result.action, Action::RecordedOnly);

    let tags: Vec<&str> = result.findings.iter().map(|f| f.tag.as_str()).collect();
    assert!(tags.contains(&"Make"));
    assert!(tags.contains(&"DateTimeOriginal"));
    assert!(tags.iter().any(|t| t.starts_with("GPS")));
    // The high-precision coordinates trip the heuristic as well
    assert!(tags.contains(&"heuristic:gps-precision"));

    assert!(result.sensitive_count() >= 3);
    let heuristic = result
        .findings
        .iter()
        .find(|f| f.tag == "heuristic:gps-precision")
        .unwrap();
    assert_eq!(heuristic.sensitivity, Sensitivity::Informational);
}

#[test]
fn sanitize_writes_mirrored_copies_and_preserves_sources() {
    let src = TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();

    fs::create_dir_all(src.path().join("album")).unwrap();
    write_jpeg_with_exif(&src.path().join("album/photo.jpg"));
    write_plain_png(&src.path().join("cover.png"));

    let report = Engine::builder()
        .sources(vec![src.path().to_path_buf()])
        .mode(Mode::Sanitize)
        .dest(dest.path().to_path_buf())
        .workers(2)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.summary.stripped, 2);
    assert_eq!(report.summary.failed, 0);

    dest.child("album/photo.jpg")
        .assert(predicate::path::exists());
    dest.child("cover.png").assert(predicate::path::exists());

    // Sources untouched
    assert!(src.path().join("album/photo.jpg").exists());
}

#[test]
fn second_pass_finds_no_sensitive_metadata() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_jpeg_with_exif(&src.path().join("photo.jpg"));

    let first = Engine::builder()
        .sources(vec![src.path().to_path_buf()])
        .mode(Mode::Sanitize)
        .dest(dest.path().to_path_buf())
        .workers(1)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(first.summary.stripped, 1);
    assert!(first.results[0].sensitive_count() > 0);

    // Scanning the sanitized output again detects nothing sensitive
    let second = run_report(vec![dest.path().to_path_buf()], 1);
    assert_eq!(second.results.len(), 1);
    assert_eq!(second.results[0].sensitive_count(), 0);
}

#[test]
fn sanitized_copy_keeps_color_profile_but_not_exif() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let profile = b"acsp-display-p3-test".to_vec();
    write_jpeg_with_exif_and_profile(&src.path().join("photo.jpg"), &profile);

    let report = Engine::builder()
        .sources(vec![src.path().to_path_buf()])
        .mode(Mode::Sanitize)
        .dest(dest.path().to_path_buf())
        .workers(1)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.summary.stripped, 1);
    assert!(report.results[0].sensitive_count() > 0);

    // The copy still carries the color profile
    let copy = dest.path().join("photo.jpg");
    let mut decoder = ImageReader::open(&copy)
        .unwrap()
        .into_decoder()
        .unwrap();
    assert_eq!(decoder.icc_profile().unwrap(), Some(profile));

    // but none of the metadata findings
    let second = run_report(vec![copy], 1);
    assert_eq!(second.results[0].sensitive_count(), 0);
}

#[test]
fn detection_matches_across_modes() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_jpeg_with_exif(&src.path().join("photo.jpg"));
    write_plain_png(&src.path().join("plain.png"));

    let recorded = run_report(vec![src.path().to_path_buf()], 2);

    let stripped = Engine::builder()
        .sources(vec![src.path().to_path_buf()])
        .mode(Mode::Sanitize)
        .dest(dest.path().to_path_buf())
        .workers(2)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(recorded.results.len(), stripped.results.len());
    for (a, b) in recorded.results.iter().zip(stripped.results.iter()) {
        assert_eq!(a.source, b.source);
        assert_eq!(a.findings, b.findings);
    }
}

#[test]
fn corrupt_file_fails_alone() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    write_jpeg_with_exif(&src.path().join("a.jpg"));
    write_plain_png(&src.path().join("b.png"));
    write_plain_png(&src.path().join("c.png"));
    fs::write(src.path().join("broken.jpg"), b"this is not a valid image").unwrap();

    let report = Engine::builder()
        .sources(vec![src.path().to_path_buf()])
        .mode(Mode::Sanitize)
        .dest(dest.path().to_path_buf())
        .workers(4)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.results.len(), 4);
    assert_eq!(report.summary.stripped, 3);
    assert_eq!(report.summary.failed, 1);

    let failed = report
        .results
        .iter()
        .find(|r| r.action == Action::Failed)
        .unwrap();
    assert!(failed.source.ends_with("broken.jpg"));
    assert!(failed.error.is_some());
}

#[test]
fn workers_share_new_parent_directories_safely() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    // Several files under the same not-yet-existing destination parent,
    // processed by parallel workers
    fs::create_dir_all(src.path().join("album")).unwrap();
    for i in 0..8 {
        write_plain_png(&src.path().join(format!("album/img{i}.png")));
    }

    let report = Engine::builder()
        .sources(vec![src.path().to_path_buf()])
        .mode(Mode::Sanitize)
        .dest(dest.path().to_path_buf())
        .workers(8)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.summary.stripped, 8);
    assert_eq!(report.summary.failed, 0);
}

#[test]
fn existing_destinations_are_skipped_then_overwritten_on_request() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    write_plain_png(&src.path().join("photo.png"));

    let run = |overwrite: bool| {
        Engine::builder()
            .sources(vec![src.path().to_path_buf()])
            .mode(Mode::Sanitize)
            .dest(dest.path().to_path_buf())
            .overwrite(overwrite)
            .workers(1)
            .build()
            .unwrap()
            .run()
            .unwrap()
    };

    assert_eq!(run(false).summary.stripped, 1);
    assert_eq!(run(false).summary.skipped, 1);
    assert_eq!(run(true).summary.stripped, 1);
}

#[test]
fn cancelled_run_still_reports_every_input() {
    let dir = TempDir::new().unwrap();
    for i in 0..10 {
        write_plain_png(&dir.path().join(format!("img{i}.png")));
    }

    let engine = Engine::builder()
        .sources(vec![dir.path().to_path_buf()])
        .mode(Mode::ReportOnly)
        .workers(2)
        .build()
        .unwrap();

    // Cancel before dispatch: everything comes back, skipped
    engine.cancel_token().cancel();
    let report = engine.run().unwrap();

    assert!(report.cancelled);
    assert_eq!(report.results.len(), 10);
    assert_eq!(report.summary.skipped, 10);
}

#[test]
fn empty_directory_yields_empty_report() {
    let dir = TempDir::new().unwrap();
    let report = run_report(vec![dir.path().to_path_buf()], 4);
    assert!(report.results.is_empty());
    assert_eq!(report.summary.scanned, 0);
}

#[test]
fn json_report_round_trips() {
    let dir = TempDir::new().unwrap();
    write_jpeg_with_exif(&dir.path().join("photo.jpg"));

    let report = run_report(vec![dir.path().to_path_buf()], 1);
    let json = serde_json::to_string(&report).unwrap();
    let back: Report = serde_json::from_str(&json).unwrap();

    assert_eq!(back.results.len(), report.results.len());
    assert_eq!(back.summary, report.summary);
}
