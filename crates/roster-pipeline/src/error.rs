//! Pipeline error types

use std::path::PathBuf;

use roster_common::RosterError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file missing or unreadable
    #[error("Failed to read source file '{}': {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration, terminal connection failure, or other shared error
    #[error(transparent)]
    Common(#[from] RosterError),

    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Failed to serialize student {student_id}: {source}")]
    Serialize {
        student_id: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("Broker rejected the message")]
    Nack,

    /// Publishing record number `position` (1-based) failed; later records were not sent
    #[error("Failed to publish student {student_id} (record {position}): {source}")]
    Publish {
        position: usize,
        student_id: i32,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Failed to persist student {student_id}: {source}")]
    Persist {
        student_id: i32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Delivery stream closed by the broker")]
    DeliveryStreamClosed,
}

impl PipelineError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Common(RosterError::config(message))
    }
}
