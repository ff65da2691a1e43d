//! Error types for the roster CLI

use roster_pipeline::PipelineError;
use roster_server::ServerError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Reader or writer failure
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// REST service failure
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed or returned an error status
    #[error("Failed to fetch students: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not a list of students
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to write '{path}': {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
