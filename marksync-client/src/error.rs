//! Remote client error types.

use thiserror::Error;

/// Result type for Markhub client operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the Markhub service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("authentication required")]
    AuthRequired,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RemoteError {
    /// True for 401/403-class failures that require re-authentication.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::AuthFailed(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors coming out of a shared single-flight are `Arc`-wrapped because
/// every joined caller observes the same failure. Unwrap back into an owned
/// error, preserving the variants the callers branch on.
impl From<std::sync::Arc<RemoteError>> for RemoteError {
    fn from(e: std::sync::Arc<RemoteError>) -> Self {
        match &*e {
            RemoteError::AuthRequired => RemoteError::AuthRequired,
            RemoteError::AuthFailed(s) => RemoteError::AuthFailed(s.clone()),
            RemoteError::Api(s) => RemoteError::Api(s.clone()),
            RemoteError::NotFound(s) => RemoteError::NotFound(s.clone()),
            RemoteError::Http(err) => RemoteError::Api(format!("HTTP error: {err}")),
            RemoteError::Serialization(err) => RemoteError::Api(format!("serialization error: {err}")),
            RemoteError::Config(s) => RemoteError::Config(s.clone()),
        }
    }
}
