//! UseCase errors.

use thiserror::Error;

/// Authentication failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or unknown token")]
    Unauthorized,

    #[error("Session lookup failed: {0}")]
    Repository(String),
}

/// Failures while posting a chat message.
///
/// Whatever the variant, the message has not been broadcast.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("Channel '{0}' does not exist")]
    ChannelNotFound(String),

    #[error("Channel lookup failed: {0}")]
    ChannelLookupFailed(String),

    #[error("Failed to persist message: {0}")]
    PersistenceFailed(String),

    #[error("Persisting the message did not finish within {0:?}")]
    PersistenceTimedOut(std::time::Duration),

    #[error("Failed to broadcast message: {0}")]
    BroadcastFailed(String),
}

/// File upload/download failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileError {
    #[error("File '{0}' not found")]
    NotFound(String),

    #[error("File storage failed: {0}")]
    Repository(String),
}
