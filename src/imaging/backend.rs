//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the compression
//! pipeline needs: identify (read intrinsic dimensions) and encode (resize +
//! re-encode to one output file, reporting its byte size).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust decode and
//! JPEG/PNG encode via the `image` crate, lossy WebP via libwebp.

use super::params::EncodeParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Both operations must be implemented so the solver is backend-agnostic;
/// tests drive the solver with a recording mock instead of real codecs.
pub trait ImageBackend: Sync {
    /// Read intrinsic image dimensions. No side effects beyond the read.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Execute one encode attempt: decode the source, resize to the planned
    /// dimensions, encode with the given settings to `params.output`
    /// (overwriting prior content there), and return the artifact byte size.
    fn encode(&self, params: &EncodeParams) -> Result<u64, BackendError>;
}
