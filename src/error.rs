//! Error types for remail.

/// Top-level error type for one forwarding invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid trigger event: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Message store error: {0}")]
    Store(#[from] StoreError),

    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Trigger event validation errors.
///
/// Any of these fail the invocation before external I/O is attempted.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Expected exactly 1 record, got {0}")]
    WrongRecordCount(usize),

    #[error("Unexpected event source: {0}")]
    WrongSource(String),

    #[error("Unexpected event version: {0}")]
    WrongVersion(String),

    #[error("Malformed event payload: {0}")]
    Malformed(String),
}

/// Message store errors (fetch/delete).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Message {message_id} not found in store")]
    NotFound { message_id: String },

    #[error("Store I/O failed for message {message_id}: {reason}")]
    Io { message_id: String, reason: String },
}

/// Message rewrite errors.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("No destinations for recipient key {key}")]
    MissingDestinations { key: String },
}

/// Mail sender errors.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Invalid envelope address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Send failed for recipient key {key}: {reason}")]
    Transport { key: String, reason: String },

    #[error("{failed} of {attempted} sends failed")]
    Failed { failed: usize, attempted: usize },
}

/// Result type alias for the forwarder.
pub type Result<T> = std::result::Result<T, Error>;
