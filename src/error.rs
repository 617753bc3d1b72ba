//! Error types for OCR, annotation, rendering and export operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the annotator components
///
/// Out-of-range edits are not errors; the store reports them as `false`.
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// OCR endpoint unreachable or answered with a non-success status
    #[error("OCR request failed: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// OCR response did not have the expected shape
    #[error("malformed OCR response: {0}")]
    MalformedResponse(String),

    /// Image file could not be read or decoded
    #[error("failed to decode image {path:?}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Export or render destination could not be written
    #[error("failed to write {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    /// Configured font file could not be loaded
    #[error("failed to load font {path:?}: {message}")]
    FontLoad { path: PathBuf, message: String },
}

impl AnnotatorError {
    pub(crate) fn transport(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result alias for annotator operations
pub type Result<T> = std::result::Result<T, AnnotatorError>;
