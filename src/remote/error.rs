//! Remote API error types

use thiserror::Error;

/// Errors that can occur when talking to the git-hosting API
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Network unreachable or connection refused
    #[error("Remote unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Token rejected by the API
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Branch, commit, or file does not exist on the remote
    #[error("Not found: {0}")]
    NotFound(String),

    /// API rate limit hit, retry after the given number of seconds
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The branch ref moved underneath us: another submission won the race.
    /// The whole commit sequence must be rerun from the new head.
    #[error("Branch ref update rejected (concurrent commit?): {0}")]
    RefConflict(String),

    /// Any other non-success API response
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body did not decode as expected (bad base64, bad JSON shape)
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

/// Result type alias for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RemoteError::NotFound("data/basil/index.json".to_string());
        assert_eq!(err.to_string(), "Not found: data/basil/index.json");

        let err = RemoteError::RateLimited(120);
        assert_eq!(err.to_string(), "Rate limited, retry after 120 seconds");
    }

    #[test]
    fn test_ref_conflict_mentions_concurrency() {
        let err = RemoteError::RefConflict("not a fast forward".to_string());
        assert!(err.to_string().contains("concurrent"));
    }
}
