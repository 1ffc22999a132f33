//! Error types for md2nb.
//!
//! Library crates use [`Md2nbError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all md2nb operations.
#[derive(Debug, thiserror::Error)]
pub enum Md2nbError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input document is not valid UTF-8 text.
    #[error("{path:?} is not valid UTF-8 text")]
    Encoding { path: PathBuf },

    /// Notebook JSON could not be produced or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Data validation error (unsupported nbformat, bad option, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// One or more documents failed in a batch run that kept going.
    #[error("{failed} document(s) failed to convert")]
    Batch { failed: usize },

    /// A conversion task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, Md2nbError>;

impl Md2nbError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    ///
    /// Invalid UTF-8 reported by `read_to_string` becomes [`Md2nbError::Encoding`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::InvalidData {
            return Self::Encoding { path };
        }
        Self::Io { path, source }
    }
}

impl From<serde_json::Error> for Md2nbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
