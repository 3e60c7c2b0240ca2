//! Error types for the case notification engine.

use thiserror::Error;

/// Unified error type for model and configuration operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown event type name
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Invalid timezone string
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}
