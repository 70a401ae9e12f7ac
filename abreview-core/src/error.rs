//! Error types for the HTTP boundary.

use thiserror::Error;

/// Longest response body kept in a [`LoadError::Status`] message.
const MAX_BODY_EXCERPT: usize = 200;

/// A failed request to the results API. Always recoverable: the view shows it
/// inline with a retry affordance.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection refused, DNS failure, TLS error, etc.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose envelope reported `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Body was not the JSON shape the client expects.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Task ids are path segments; anything else is refused before sending.
    #[error("invalid task id: {0:?}")]
    InvalidTaskId(String),

    /// The HTTP client could not be constructed.
    #[error("client setup failed: {0}")]
    Client(String),
}

impl LoadError {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let mut excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        if excerpt.len() < body.len() {
            excerpt.push('…');
        }
        LoadError::Status { status, body: excerpt }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LoadError::Timeout
        } else {
            LoadError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Malformed(e.to_string())
    }
}

/// Convenience Result type for API calls.
pub type Result<T> = std::result::Result<T, LoadError>;
