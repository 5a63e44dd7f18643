//! Parameter types for encode operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`solver`](crate::solver) (which decides what to
//! encode and at which quality) and the [`backend`](super::backend) (which
//! does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing solver logic.
//!
//! ## Types
//!
//! - [`Quality`] — Encoding quality (1–100, default 80). Clamped on construction.
//! - [`OutputFormat`] — The three supported output targets. Anything else is
//!   rejected at request validation, never passed through untouched.
//! - [`CodecSettings`] — Format-specific encode parameters built by
//!   [`CodecSettings::for_output`].
//! - [`EncodeParams`] — Full specification for one encode attempt: source,
//!   output path, target dimensions, codec settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Quality setting for image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Clamp upward to `floor` (used by the solver so no attempt ever runs
    /// below its quality floor).
    pub fn floored(self, floor: u32) -> Self {
        Self::new(self.0.max(floor))
    }

    /// Step down by `step`, bottoming out at `floor`.
    ///
    /// Returns the same value once the floor is reached, which the solver
    /// uses as its termination signal.
    pub fn step_down(self, step: u32, floor: u32) -> Self {
        Self::new(self.0.saturating_sub(step).max(floor))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported output formats.
///
/// Parsing is strict: any other name (`"bmp"`, `"tiff"`, ...) fails with
/// [`UnsupportedFormat`] before any file I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

/// Error for an output format name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported output format: {0} (supported: jpeg, png, webp)")]
pub struct UnsupportedFormat(pub String);

impl OutputFormat {
    /// File extension for artifacts in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            other => Err(UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// JPEG encode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegSettings {
    pub quality: Quality,
    /// Emit optimized Huffman tables. The settings are backend-agnostic;
    /// backends without an entropy-optimization toggle document that they
    /// ignore this.
    pub optimize_coding: bool,
}

/// PNG encode parameters.
///
/// `quality` here controls palette/color reduction aggressiveness, not a
/// lossy factor — PNG itself is lossless. `compression_level` is the
/// DEFLATE effort knob (0 fastest, 9 smallest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngSettings {
    pub quality: Quality,
    pub compression_level: u8,
}

/// WebP encode parameters (lossy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebPSettings {
    pub quality: Quality,
}

/// Format-specific encode parameters.
///
/// Built once per attempt by [`CodecSettings::for_output`]; every supported
/// format gets an explicit transformation here — there is no pass-through
/// arm for unrecognized formats because [`OutputFormat`] is a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecSettings {
    Jpeg(JpegSettings),
    Png(PngSettings),
    WebP(WebPSettings),
}

impl CodecSettings {
    /// Map an output format and quality level to codec parameters.
    pub fn for_output(format: OutputFormat, quality: Quality) -> Self {
        match format {
            OutputFormat::Jpeg => CodecSettings::Jpeg(JpegSettings {
                quality,
                optimize_coding: true,
            }),
            OutputFormat::Png => CodecSettings::Png(PngSettings {
                quality,
                compression_level: 9,
            }),
            OutputFormat::WebP => CodecSettings::WebP(WebPSettings { quality }),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            CodecSettings::Jpeg(_) => OutputFormat::Jpeg,
            CodecSettings::Png(_) => OutputFormat::Png,
            CodecSettings::WebP(_) => OutputFormat::WebP,
        }
    }

    pub fn quality(&self) -> Quality {
        match self {
            CodecSettings::Jpeg(s) => s.quality,
            CodecSettings::Png(s) => s.quality,
            CodecSettings::WebP(s) => s.quality,
        }
    }
}

/// Full specification for one encode attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target dimensions from the fit-inside plan. Equal to the source
    /// dimensions when no resize is needed.
    pub width: u32,
    pub height: u32,
    pub settings: CodecSettings,
}
