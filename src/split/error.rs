//! Pipeline error types

use std::path::PathBuf;

use thiserror::Error;

use crate::xlsx::XlsxError;

/// Failure taxonomy for a split run.
///
/// No variant is retried: a failed run leaves whatever chunks were already
/// written in place, and the next run's output cleanup is the recovery
/// mechanism.
#[derive(Error, Debug)]
pub enum SplitError {
    /// The input path does not exist. The CLI reports this and terminates
    /// normally rather than treating it as a crash.
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to clear output entry {path}: {source}")]
    OutputCleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] XlsxError),

    #[error("Failed to write chunk {path}: {source}")]
    ChunkWrite { path: PathBuf, source: XlsxError },

    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),
}
