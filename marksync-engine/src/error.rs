//! Engine error types.

use crate::local_tree::TreeError;
use marksync_client::RemoteError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in the reconciliation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("local tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("folder scorer error: {0}")]
    Scorer(String),

    #[error("no pending recommendation for bookmark {0}")]
    UnknownRecommendation(String),

    #[error("service channel closed")]
    ChannelClosed,
}
