//! Producer: one message per record, in file order
//!
//! Publishing stops at the first failure. Records before it stay published,
//! records after it are never sent.

use async_trait::async_trait;
use roster_common::Student;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Sink for serialized student messages
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one payload; returns once the broker has confirmed it
    async fn publish(&self, payload: &[u8]) -> Result<()>;
}

/// Publish every record in order and return how many were sent
pub async fn publish_all<P>(students: &[Student], publisher: &P) -> Result<usize>
where
    P: Publisher + ?Sized,
{
    let total = students.len();

    for (idx, student) in students.iter().enumerate() {
        let position = idx + 1;

        let payload = student
            .to_payload()
            .map_err(|source| PipelineError::Serialize {
                student_id: student.id,
                source,
            })?;

        publisher
            .publish(&payload)
            .await
            .map_err(|e| PipelineError::Publish {
                position,
                student_id: student.id,
                source: Box::new(e),
            })?;

        debug!(student_id = student.id, position, total, "Published student");
    }

    info!(published = total, "All students published");
    Ok(total)
}
