//! Error taxonomy for the evaluation harness.
//!
//! Loading is one-shot and offline: nothing here is retried, and any failure
//! aborts the current run. Model adapter failures are wrapped and propagated
//! without recovery.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    /// A dataset file or checkpoint is missing on disk.
    #[error("resource not found: {0}")]
    ResourceNotFound(PathBuf),

    /// On-disk data is structurally inconsistent: bad sparse arrays, shape
    /// mismatches between a matrix and its labels, malformed text records.
    #[error("malformed data: {0}")]
    DataFormat(String),

    /// The requested model family has no adapter linked into this build.
    #[error("model family '{0}' is not available in this build")]
    ModelUnavailable(String),

    /// Failure reported by a model adapter.
    #[error("model error: {0}")]
    Model(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("npy read: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("npz read: {0}")]
    NpzRead(#[from] ndarray_npy::ReadNpzError),

    #[error("npz write: {0}")]
    NpzWrite(#[from] ndarray_npy::WriteNpzError),

    #[error("npy write: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),
}

/// Open a file for reading, mapping a missing path to `ResourceNotFound`
/// so callers can tell "not there" apart from other I/O failures.
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            BenchError::ResourceNotFound(path.to_path_buf())
        } else {
            BenchError::Io(e)
        }
    })
}
