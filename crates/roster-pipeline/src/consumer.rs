//! Consumer: decode each delivery and persist it
//!
//! | Event                     | Outcome                               |
//! |---------------------------|---------------------------------------|
//! | payload is not a student  | warn, skip, keep consuming            |
//! | insert fails              | fatal, [`PipelineError::Persist`]     |
//! | delivery stream errors    | fatal, [`PipelineError::Broker`]      |
//! | delivery stream ends      | fatal, [`DeliveryStreamClosed`]       |
//!
//! Messages are handled one at a time in delivery order.
//!
//! [`DeliveryStreamClosed`]: PipelineError::DeliveryStreamClosed

use std::convert::Infallible;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use roster_common::Student;
use tracing::{debug, info, warn};

use crate::config::AckMode;
use crate::error::{PipelineError, Result};
use crate::store::StudentStore;

/// A message handed out by the broker
#[async_trait]
pub trait Inbound: Send + Sync {
    fn body(&self) -> &[u8];

    /// Acknowledge the message (only used in [`AckMode::AfterPersist`])
    async fn ack(&self) -> Result<()>;
}

/// Running totals, logged as the consumer goes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub stored: u64,
    pub skipped: u64,
}

/// Consume `deliveries` until a fatal condition, which is returned as the error
pub async fn run<S, M, T>(
    deliveries: S,
    store: &mut T,
    ack_mode: AckMode,
) -> Result<Infallible>
where
    S: Stream<Item = Result<M>> + Send,
    M: Inbound,
    T: StudentStore + ?Sized,
{
    let mut deliveries = std::pin::pin!(deliveries);
    let mut stats = ConsumerStats::default();

    while let Some(delivery) = deliveries.next().await {
        let delivery = delivery?;
        handle(&delivery, store, ack_mode, &mut stats).await?;
    }

    info!(stored = stats.stored, skipped = stats.skipped, "Delivery stream ended");
    Err(PipelineError::DeliveryStreamClosed)
}

async fn handle<M, T>(
    delivery: &M,
    store: &mut T,
    ack_mode: AckMode,
    stats: &mut ConsumerStats,
) -> Result<()>
where
    M: Inbound,
    T: StudentStore + ?Sized,
{
    let student = match Student::from_payload(delivery.body()) {
        Ok(student) => student,
        Err(e) => {
            warn!(
                error = %e,
                payload = %String::from_utf8_lossy(delivery.body()),
                "Skipping malformed message"
            );
            stats.skipped += 1;
            if ack_mode == AckMode::AfterPersist {
                delivery.ack().await?;
            }
            return Ok(());
        },
    };

    store
        .insert(&student)
        .await
        .map_err(|source| PipelineError::Persist {
            student_id: student.id,
            source,
        })?;

    stats.stored += 1;
    info!(
        student_id = student.id,
        name = %student.name,
        major = %student.major,
        "Inserted student"
    );

    if ack_mode == AckMode::AfterPersist {
        delivery.ack().await?;
        debug!(student_id = student.id, "Delivery acknowledged");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FakeDelivery {
        body: Vec<u8>,
        acked: Arc<AtomicBool>,
    }

    impl FakeDelivery {
        fn new(body: &str) -> (Self, Arc<AtomicBool>) {
            let acked = Arc::new(AtomicBool::new(false));
            (
                Self {
                    body: body.as_bytes().to_vec(),
                    acked: acked.clone(),
                },
                acked,
            )
        }
    }

    #[async_trait]
    impl Inbound for FakeDelivery {
        fn body(&self) -> &[u8] {
            &self.body
        }

        async fn ack(&self) -> Result<()> {
            self.acked.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Stores rows in memory; rejects duplicate ids like a primary key would
    #[derive(Default)]
    struct MemoryStore {
        rows: Vec<Student>,
    }

    #[async_trait]
    impl StudentStore for MemoryStore {
        async fn insert(&mut self, student: &Student) -> std::result::Result<(), sqlx::Error> {
            if self.rows.iter().any(|s| s.id == student.id) {
                return Err(sqlx::Error::Protocol(format!(
                    "duplicate key value violates unique constraint: id={}",
                    student.id
                )));
            }
            self.rows.push(student.clone());
            Ok(())
        }
    }

    fn stream_of(
        items: Vec<FakeDelivery>,
    ) -> impl Stream<Item = Result<FakeDelivery>> + Send {
        futures::stream::iter(items.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn test_stores_in_delivery_order_and_skips_malformed() {
        let (a, _) = FakeDelivery::new(r#"{"id":1,"name":"Alice","major":"CS"}"#);
        let (bad, _) = FakeDelivery::new("not json");
        let (b, _) = FakeDelivery::new(r#"{"id":2,"name":"Bob","major":"Math"}"#);
        let mut store = MemoryStore::default();

        let err = run(stream_of(vec![a, bad, b]), &mut store, AckMode::Auto)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::DeliveryStreamClosed));
        assert_eq!(
            store.rows,
            vec![Student::new(1, "Alice", "CS"), Student::new(2, "Bob", "Math")]
        );
    }

    #[tokio::test]
    async fn test_wrong_shape_is_skipped() {
        let (wrong, _) = FakeDelivery::new(r#"{"id":"seven","name":"X","major":"Y"}"#);
        let (ok, _) = FakeDelivery::new(r#"{"id":7,"name":"X","major":"Y"}"#);
        let mut store = MemoryStore::default();

        let _ = run(stream_of(vec![wrong, ok]), &mut store, AckMode::Auto).await;

        assert_eq!(store.rows, vec![Student::new(7, "X", "Y")]);
    }

    #[tokio::test]
    async fn test_insert_failure_is_fatal() {
        let (first, _) = FakeDelivery::new(r#"{"id":1,"name":"Alice","major":"CS"}"#);
        let (dup, _) = FakeDelivery::new(r#"{"id":1,"name":"Again","major":"CS"}"#);
        let (never, _) = FakeDelivery::new(r#"{"id":2,"name":"Bob","major":"Math"}"#);
        let mut store = MemoryStore::default();

        let err = run(stream_of(vec![first, dup, never]), &mut store, AckMode::Auto)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persist { student_id: 1, .. }));
        // Nothing after the failing message is processed
        assert_eq!(store.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_error_is_fatal() {
        let (a, _) = FakeDelivery::new(r#"{"id":1,"name":"Alice","major":"CS"}"#);
        let items: Vec<Result<FakeDelivery>> =
            vec![Ok(a), Err(PipelineError::DeliveryStreamClosed)];
        let mut store = MemoryStore::default();

        let err = run(futures::stream::iter(items), &mut store, AckMode::Auto)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::DeliveryStreamClosed));
        assert_eq!(store.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_auto_mode_never_acks() {
        let (a, acked) = FakeDelivery::new(r#"{"id":1,"name":"Alice","major":"CS"}"#);
        let mut store = MemoryStore::default();

        let _ = run(stream_of(vec![a]), &mut store, AckMode::Auto).await;

        assert!(!acked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_after_persist_acks_stored_and_malformed() {
        let (a, a_acked) = FakeDelivery::new(r#"{"id":1,"name":"Alice","major":"CS"}"#);
        let (bad, bad_acked) = FakeDelivery::new("{");
        let mut store = MemoryStore::default();

        let _ = run(stream_of(vec![a, bad]), &mut store, AckMode::AfterPersist).await;

        assert!(a_acked.load(Ordering::SeqCst));
        assert!(bad_acked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_after_persist_does_not_ack_failed_insert() {
        let (first, _) = FakeDelivery::new(r#"{"id":1,"name":"Alice","major":"CS"}"#);
        let (dup, dup_acked) = FakeDelivery::new(r#"{"id":1,"name":"Again","major":"CS"}"#);
        let mut store = MemoryStore::default();

        let err = run(stream_of(vec![first, dup]), &mut store, AckMode::AfterPersist)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persist { .. }));
        assert!(!dup_acked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_id_zero_is_stored() {
        let (zero, _) = FakeDelivery::new(r#"{"id":0,"name":"Nobody","major":"None"}"#);
        let mut store = MemoryStore::default();

        let _ = run(stream_of(vec![zero]), &mut store, AckMode::Auto).await;

        assert_eq!(store.rows, vec![Student::new(0, "Nobody", "None")]);
    }
}
