//! Error types for ArticleForge.
//!
//! Library crates use [`ArticleForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Note that most provider failures never surface here: the pipeline
//! stages recover them locally into empty results (see the stage crates).
//! These variants cover the failures that ARE allowed to propagate —
//! configuration, storage writes, and payload validation.

use std::path::PathBuf;

/// Top-level error type for all ArticleForge operations.
#[derive(Debug, thiserror::Error)]
pub enum ArticleForgeError {
    /// Configuration loading or validation error (missing secrets, bad TOML).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to an external provider.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Article storage API error (list/create/update rejected or unreachable).
    #[error("storage error: {0}")]
    Storage(String),

    /// Rewrite provider error (API failure or malformed model response).
    #[error("rewrite error: {0}")]
    Rewrite(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty required field, invalid payload).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArticleForgeError>;

impl ArticleForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
