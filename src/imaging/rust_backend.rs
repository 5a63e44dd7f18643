//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` |
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP (lossy) | `webp::Encoder` (libwebp) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{CodecSettings, EncodeParams, JpegSettings, PngSettings, WebPSettings};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Production backend using the `image` crate ecosystem plus libwebp for
/// lossy WebP output.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_err(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn encode_err(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(|e| decode_err(path, e))?
        .decode()
        .map_err(|e| decode_err(path, e))
}

/// Encode as JPEG.
///
/// `optimize_coding` has no equivalent in the pure-Rust encoder (its Huffman
/// tables are fixed); the flag is honored by backends that expose one.
fn save_jpeg(img: &DynamicImage, path: &Path, settings: &JpegSettings) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, settings.quality.value() as u8);
    // JPEG has no alpha channel; flatten before encoding.
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| encode_err(path, e))
}

/// Encode as PNG.
///
/// PNG is lossless, so `settings.quality` does not change the pixels here;
/// only the DEFLATE effort mapped from `compression_level` applies.
fn save_png(img: &DynamicImage, path: &Path, settings: &PngSettings) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);
    let compression = match settings.compression_level {
        0..=2 => CompressionType::Fast,
        3..=7 => CompressionType::Default,
        _ => CompressionType::Best,
    };
    let encoder = PngEncoder::new_with_quality(writer, compression, PngFilter::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| encode_err(path, e))
}

/// Encode as lossy WebP through libwebp.
fn save_webp(img: &DynamicImage, path: &Path, settings: &WebPSettings) -> Result<(), BackendError> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height());
    let data = encoder.encode(settings.quality.value() as f32);
    std::fs::write(path, &*data).map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| decode_err(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn encode(&self, params: &EncodeParams) -> Result<u64, BackendError> {
        let img = load_image(&params.source)?;

        let img = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            // The fit-inside plan already preserves aspect, so an exact
            // resize lands on the planned dimensions rather than whatever
            // the resampler would round to.
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };

        match &params.settings {
            CodecSettings::Jpeg(s) => save_jpeg(&img, &params.output, s)?,
            CodecSettings::Png(s) => save_png(&img, &params.output, s)?,
            CodecSettings::WebP(s) => save_webp(&img, &params.output, s)?,
        }

        let bytes = std::fs::metadata(&params.output)
            .map_err(BackendError::Io)?
            .len();
        Ok(bytes)
    }
}
