//! Journal error types

use thiserror::Error;

use crate::cache::CacheError;
use crate::images::ImageError;
use crate::remote::RemoteError;

/// Errors from journal operations
#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Photo error: {0}")]
    Image(#[from] ImageError),

    #[error("No experiment named {0:?}")]
    ExperimentNotFound(String),

    #[error("Experiment {0:?} already exists")]
    ExperimentExists(String),

    #[error("Invalid slug {0:?}: use lowercase letters, digits, and hyphens")]
    InvalidSlug(String),

    #[error("Document error in {path}: {error}")]
    Document { path: String, error: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for journal operations
pub type JournalResult<T> = Result<T, JournalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JournalError::ExperimentNotFound("lettuce".to_string());
        assert_eq!(err.to_string(), "No experiment named \"lettuce\"");

        let err = JournalError::InvalidSlug("Basil DWC".to_string());
        assert!(err.to_string().contains("lowercase"));
    }
}
