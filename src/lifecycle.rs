//! Temporary-file lifecycle for compression jobs.
//!
//! A [`Workspace`] owns the two working directories (staged sources and
//! encoded artifacts) and hands out per-job unique paths; a [`CleanupGuard`]
//! guarantees the files a job touched are removed on every exit path —
//! success, any pipeline failure, or a delivery failure after a successful
//! encode. Deletion failures are logged as warnings and never mask the
//! job's primary outcome.
//!
//! Directory creation is an idempotent setup step ([`Workspace::ensure`]),
//! kept out of the per-request hot path.

use crate::imaging::OutputFormat;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Source file types accepted for staging. Matches the decoders compiled
/// into the backend.
pub const ALLOWED_SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("source file not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported source type {extension:?} (allowed: jpg, jpeg, png, gif, webp)")]
    UnsupportedType { extension: String },
    #[error("source is {bytes} B, over the {limit} B ceiling")]
    TooLarge { bytes: u64, limit: u64 },
}

/// Working directories for staged sources and encoded artifacts.
///
/// Paths are injected at construction; nothing here reads global state.
#[derive(Debug, Clone)]
pub struct Workspace {
    uploads_dir: PathBuf,
    compressed_dir: PathBuf,
}

impl Workspace {
    /// Lay the workspace out under a single root: `<root>/uploads` and
    /// `<root>/compressed`.
    pub fn new(root: &Path) -> Self {
        Self {
            uploads_dir: root.join("uploads"),
            compressed_dir: root.join("compressed"),
        }
    }

    /// Create both directories. Idempotent; call once at startup.
    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.uploads_dir)?;
        fs::create_dir_all(&self.compressed_dir)
    }

    /// Stage a source file into the uploads directory under a unique name.
    ///
    /// This is the intake contract: the file must exist, carry an allowlisted
    /// image extension, and sit under the size ceiling. The staged copy is
    /// owned by the job from here on — the caller's original is not touched.
    pub fn stage_source(&self, original: &Path, max_bytes: u64) -> Result<PathBuf, StageError> {
        let extension = original
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ALLOWED_SOURCE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(StageError::UnsupportedType { extension });
        }

        let meta = fs::metadata(original)
            .map_err(|_| StageError::NotFound(original.to_path_buf()))?;
        if meta.len() > max_bytes {
            return Err(StageError::TooLarge {
                bytes: meta.len(),
                limit: max_bytes,
            });
        }

        let file_name = original
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("source");
        let staged = self
            .uploads_dir
            .join(format!("{}-{}", Uuid::new_v4(), file_name));
        fs::copy(original, &staged)?;
        Ok(staged)
    }

    /// Allocate a unique artifact path in the requested output format.
    /// Nothing is written; the encode loop creates (and overwrites) the file.
    pub fn allocate_output(&self, format: OutputFormat) -> PathBuf {
        self.compressed_dir.join(format!(
            "compressed-{}.{}",
            Uuid::new_v4(),
            format.extension()
        ))
    }
}

/// Scoped deletion of a job's temporary files.
///
/// Every path handed to [`track`](CleanupGuard::track) is removed when the
/// guard drops, however the job ended. Files already gone are fine; any
/// other deletion failure is logged and swallowed so cleanup can never
/// replace the job's real result or error.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    files: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for path in &self.files {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary file");
                }
            }
        }
    }
}
