//! Error types for loading and writing arena data.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading sessions or writing meshes.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Session has {markers} marker samples but {bodies} body samples")]
    LengthMismatch { markers: usize, bodies: usize },

    #[error("Could not move temporary file into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Mesh face {face} references {kind} {index}, but only {count} exist")]
    DanglingIndex {
        face: usize,
        kind: &'static str,
        index: usize,
        count: usize,
    },
}
