//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{name} is too long ({len} > {max})")]
    TooLong {
        name: &'static str,
        len: usize,
        max: usize,
    },
}

/// Errors reported by persistence collaborators
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported when an event cannot be handed to the hub
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("Failed to encode event: {0}")]
    Encode(String),

    #[error("Hub is not running")]
    HubClosed,
}
