//! End-to-end pipeline tests against the real backend: stage a source,
//! run the solver, deliver the artifact, and verify the workspace is clean
//! afterwards on both the success and failure paths.

use image::{ImageEncoder, RgbImage};
use imgpress::imaging::{ImageBackend, OutputFormat, Quality, RustBackend};
use imgpress::lifecycle::{CleanupGuard, Workspace};
use imgpress::solver::{self, CompressError, CompressionRequest, SolverSettings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CEILING: u64 = 10 * 1024 * 1024;

/// Create a small valid JPEG with enough detail that quality changes move
/// the encoded size.
fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

fn request(source: impl Into<std::path::PathBuf>, format: OutputFormat) -> CompressionRequest {
    CompressionRequest {
        source: source.into(),
        format,
        quality: Quality::new(80),
        max_width: None,
        max_height: None,
        target_size: None,
    }
}

#[test]
fn compress_resize_deliver_and_clean_up() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.jpg");
    create_test_jpeg(&input, 400, 300);

    let workspace = Workspace::new(&tmp.path().join("work"));
    workspace.ensure().unwrap();
    let destination = tmp.path().join("photo-compressed.webp");

    let (staged, artifact);
    {
        let mut guard = CleanupGuard::new();
        staged = workspace.stage_source(&input, CEILING).unwrap();
        guard.track(&staged);
        artifact = workspace.allocate_output(OutputFormat::WebP);
        guard.track(&artifact);

        let req = CompressionRequest {
            max_width: Some(200),
            ..request(&staged, OutputFormat::WebP)
        };
        let result = solver::compress(
            &RustBackend::new(),
            &req,
            &artifact,
            &SolverSettings::default(),
        )
        .unwrap();

        assert_eq!(result.attempts_used, 1);
        assert!(result.target_met);
        assert_eq!(result.compressed_bytes, fs::metadata(&artifact).unwrap().len());

        fs::copy(&artifact, &destination).unwrap();
    }

    // Delivered artifact survives with the planned dimensions…
    let dims = RustBackend::new().identify(&destination).unwrap();
    assert_eq!((dims.width, dims.height), (200, 150));
    // …while every staged file is gone and the caller's input is intact.
    assert!(!staged.exists());
    assert!(!artifact.exists());
    assert!(input.exists());
}

#[test]
fn achievable_target_met_on_first_attempt() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.jpg");
    create_test_jpeg(&input, 256, 256);

    let output = tmp.path().join("out.jpeg");
    let result = solver::compress(
        &RustBackend::new(),
        &CompressionRequest {
            target_size: Some(CEILING),
            ..request(&input, OutputFormat::Jpeg)
        },
        &output,
        &SolverSettings::default(),
    )
    .unwrap();

    assert!(result.target_met);
    assert_eq!(result.attempts_used, 1);
    assert_eq!(result.final_quality, Quality::new(80));
}

#[test]
fn unreachable_target_descends_to_floor_and_reports_it() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photo.jpg");
    create_test_jpeg(&input, 256, 256);

    let output = tmp.path().join("out.webp");
    let result = solver::compress(
        &RustBackend::new(),
        &CompressionRequest {
            target_size: Some(1), // no codec gets there
            ..request(&input, OutputFormat::WebP)
        },
        &output,
        &SolverSettings::default(),
    )
    .unwrap();

    // 80 → 10 in steps of 10, then the floor stops the search
    assert_eq!(result.attempts_used, 8);
    assert_eq!(result.final_quality, Quality::new(10));
    assert!(!result.target_met);
    // The best-effort artifact is still on disk and matches the report
    assert_eq!(result.compressed_bytes, fs::metadata(&output).unwrap().len());
}

#[test]
fn failed_decode_still_cleans_the_workspace() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("broken.jpg");
    fs::write(&input, b"not actually a jpeg").unwrap();

    let workspace = Workspace::new(&tmp.path().join("work"));
    workspace.ensure().unwrap();

    let staged;
    {
        let mut guard = CleanupGuard::new();
        staged = workspace.stage_source(&input, CEILING).unwrap();
        guard.track(&staged);
        let artifact = workspace.allocate_output(OutputFormat::Png);
        guard.track(&artifact);

        let err = solver::compress(
            &RustBackend::new(),
            &request(&staged, OutputFormat::Png),
            &artifact,
            &SolverSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CompressError::Decode(_)));
    }

    assert!(!staged.exists());
}
