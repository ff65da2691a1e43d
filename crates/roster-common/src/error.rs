//! Error types shared across roster crates

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, RosterError>;

/// Main error type for roster
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to {resource} after {attempts} attempts: {message}")]
    Connect {
        resource: String,
        attempts: u32,
        message: String,
    },
}

impl RosterError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl<E: std::fmt::Display> From<crate::retry::RetryError<E>> for RosterError {
    fn from(err: crate::retry::RetryError<E>) -> Self {
        Self::Connect {
            resource: err.resource,
            attempts: err.attempts,
            message: err.source.to_string(),
        }
    }
}
