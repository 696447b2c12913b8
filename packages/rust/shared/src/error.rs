//! Error types for the curriculum seeder.
//!
//! Library crates use [`SeederError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all seeder operations.
#[derive(Debug, thiserror::Error)]
pub enum SeederError {
    /// A descriptor, outline, or exercise file does not exist.
    #[error("not found: {path:?}")]
    NotFound { path: PathBuf },

    /// Malformed descriptor, faq block, or response body.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Transport failure or unexpected response from the content service.
    #[error("remote error: {0}")]
    Remote(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SeederError>;

impl SeederError {
    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    ///
    /// `ErrorKind::NotFound` becomes [`SeederError::NotFound`] so callers can
    /// treat missing files as skips.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        Self::Io { path, source }
    }

    /// Whether this error is a missing-resource condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SeederError::parse("faq block needs at least 4 lines");
        assert_eq!(err.to_string(), "parse error: faq block needs at least 4 lines");

        let err = SeederError::Remote("POST /course: HTTP 500".into());
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn io_not_found_maps_to_not_found() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = SeederError::io("/tmp/python/info.md", source);
        assert!(err.is_not_found());

        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = SeederError::io("/tmp/python/info.md", source);
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("info.md"));
    }
}
