//! The size-constrained compression solver.
//!
//! One [`CompressionRequest`] in, one [`CompressionResult`] out. The solver
//! probes the source, plans fit-inside dimensions, and drives the backend's
//! encode operation — once when no target size is requested, iteratively at
//! decreasing quality when one is.
//!
//! Each iteration is a pure function of `(source, dimensions, quality)`
//! except for the single output-file write; the output path is reused across
//! attempts, so the artifact on disk is always the latest attempt and exactly
//! one file survives the loop.
//!
//! ## Quality search
//!
//! Starting from the requested quality (clamped to the floor), each attempt
//! that misses the target steps the quality down by `quality_step`, bottoming
//! out at `quality_floor`. The search terminates when the target is met, the
//! attempt budget runs out, or stepping down no longer changes the quality —
//! re-encoding at an identical quality would reproduce the identical
//! artifact, so the remaining budget is not worth burning.
//!
//! Attempts are not cancellable mid-encode. A caller that needs cancellation
//! wraps the whole [`compress`] call; attempt granularity is the finest
//! supported interruption point.

use crate::imaging::{
    BackendError, CodecSettings, EncodeParams, ImageBackend, OutputFormat, Quality,
    UnsupportedFormat, fit_within,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    /// Invalid request shape. Detected before any filesystem or codec work;
    /// never retried.
    #[error("invalid request: {0}")]
    Config(String),
    /// Source file unreadable as an image. Fatal to the request.
    #[error("cannot decode source image: {0}")]
    Decode(#[source] BackendError),
    /// Codec or filesystem failure during an attempt. Aborts the whole
    /// request; the solver's retries are quality adjustments, not error
    /// retries.
    #[error("encode attempt failed: {0}")]
    Encode(#[source] BackendError),
    /// The target size was not reached and the configuration asks for
    /// oversized results to be rejected rather than delivered.
    #[error(
        "target size {target} B unreachable: best attempt is {achieved} B after {attempts} attempts"
    )]
    TargetNotMet {
        target: u64,
        achieved: u64,
        attempts: u32,
    },
}

impl From<UnsupportedFormat> for CompressError {
    fn from(err: UnsupportedFormat) -> Self {
        CompressError::Config(err.to_string())
    }
}

/// One compression job. Immutable once constructed; validated once by
/// [`CompressionRequest::validate`] before any work starts.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    /// Decoded source file, staged and validated by the intake side.
    pub source: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Maximum acceptable artifact size in bytes. `None` disables the
    /// quality search.
    pub target_size: Option<u64>,
}

impl CompressionRequest {
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.target_size == Some(0) {
            return Err(CompressError::Config(
                "target size must be a positive number of bytes".into(),
            ));
        }
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(CompressError::Config(
                "dimension bounds must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Knobs for the quality search. Loaded from `[solver]` in the config file.
#[derive(Debug, Clone, Copy)]
pub struct SolverSettings {
    /// Encode attempts allowed when a target size is requested.
    pub max_attempts: u32,
    /// No attempt runs below this quality.
    pub quality_floor: u32,
    /// Quality decrement between attempts.
    pub quality_step: u32,
    /// When the budget is exhausted: `true` delivers the last (oversized)
    /// artifact with `target_met = false`, `false` fails the request with
    /// [`CompressError::TargetNotMet`].
    pub deliver_oversized: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            quality_floor: 10,
            quality_step: 10,
            deliver_oversized: true,
        }
    }
}

/// Outcome of one encode attempt.
#[derive(Debug, Clone, Copy)]
struct EncodeAttempt {
    quality: Quality,
    bytes: u64,
}

/// Terminal result of a compression request.
///
/// `target_met` is `false` only when a target size was requested and never
/// achieved within the attempt budget — the artifact is still usable, just
/// oversized, and the flag surfaces that instead of hiding it. Without a
/// target the flag is vacuously `true`.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionResult {
    pub output: PathBuf,
    pub final_quality: Quality,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub attempts_used: u32,
    pub target_met: bool,
}

impl CompressionResult {
    /// Size reduction as a percentage of the original. Negative when the
    /// re-encode grew the file.
    pub fn savings_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_bytes as f64 / self.original_bytes as f64) * 100.0
    }
}

/// Run one compression request against a backend, writing the artifact to
/// `output`.
///
/// The attempt loop reuses `output` for every iteration, overwriting prior
/// content; on success the file holds the final attempt. On error the caller
/// (the lifecycle guard) removes whatever partial artifact is left.
pub fn compress(
    backend: &impl ImageBackend,
    request: &CompressionRequest,
    output: &Path,
    settings: &SolverSettings,
) -> Result<CompressionResult, CompressError> {
    request.validate()?;

    let dims = backend
        .identify(&request.source)
        .map_err(CompressError::Decode)?;
    let (width, height) = fit_within(
        (dims.width, dims.height),
        request.max_width,
        request.max_height,
    );
    let original_bytes = std::fs::metadata(&request.source)
        .map_err(|e| CompressError::Decode(BackendError::Io(e)))?
        .len();

    let result = |attempt: EncodeAttempt, attempts_used: u32, target_met: bool| CompressionResult {
        output: output.to_path_buf(),
        final_quality: attempt.quality,
        original_bytes,
        compressed_bytes: attempt.bytes,
        attempts_used,
        target_met,
    };

    // Every attempt, including the single-shot path, respects the floor so
    // attempt qualities always sit in [floor, 100].
    let mut quality = request.quality.floored(settings.quality_floor);

    let Some(target) = request.target_size else {
        let attempt = run_attempt(backend, request, output, width, height, quality)?;
        return Ok(result(attempt, 1, true));
    };

    let mut attempts = 0u32;
    loop {
        let attempt = run_attempt(backend, request, output, width, height, quality)?;
        attempts += 1;
        tracing::debug!(
            attempt = attempts,
            quality = attempt.quality.value(),
            bytes = attempt.bytes,
            target_bytes = target,
            "encode attempt"
        );

        if attempt.bytes <= target {
            return Ok(result(attempt, attempts, true));
        }

        let exhausted = attempts >= settings.max_attempts;
        let next = quality.step_down(settings.quality_step, settings.quality_floor);
        // A repeat of the same quality reproduces the same artifact; treat
        // the floor as exhaustion rather than burning the remaining budget.
        if exhausted || next == quality {
            return if settings.deliver_oversized {
                Ok(result(attempt, attempts, false))
            } else {
                Err(CompressError::TargetNotMet {
                    target,
                    achieved: attempt.bytes,
                    attempts,
                })
            };
        }
        quality = next;
    }
}

/// One encode attempt: pure in everything but the single output-file write.
fn run_attempt(
    backend: &impl ImageBackend,
    request: &CompressionRequest,
    output: &Path,
    width: u32,
    height: u32,
    quality: Quality,
) -> Result<EncodeAttempt, CompressError> {
    let params = EncodeParams {
        source: request.source.clone(),
        output: output.to_path_buf(),
        width,
        height,
        settings: CodecSettings::for_output(request.format, quality),
    };
    let bytes = backend.encode(&params).map_err(CompressError::Encode)?;
    Ok(EncodeAttempt { quality, bytes })
}
