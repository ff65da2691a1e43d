//! Reader end: file to queue, then exit

use tracing::info;

use crate::broker::BrokerSession;
use crate::config::ReaderConfig;
use crate::error::Result;
use crate::{producer, source};

/// Load the file, publish every valid record, close the session.
///
/// The file is read before the broker is contacted, so a missing file fails
/// fast without any connection attempts. Returns the number of published
/// records.
pub async fn run(config: &ReaderConfig) -> Result<usize> {
    let students = source::load(&config.source_path).await?.students;

    let session = BrokerSession::open(&config.broker, &config.retry).await?;

    let result = async {
        session.enable_confirms().await?;
        producer::publish_all(&students, &session).await
    }
    .await;

    session.close().await;

    if let Ok(published) = result {
        info!(published, queue = %config.broker.queue, "Reader finished");
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;
    use crate::error::PipelineError;
    use roster_common::RetryPolicy;
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_file_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReaderConfig {
            source_path: dir.path().join("nope.txt"),
            // Nothing listens here; reaching the broker would fail differently
            broker: BrokerConfig {
                host: "127.0.0.1".to_string(),
                port: 1,
                ..Default::default()
            },
            retry: RetryPolicy::new(1, Duration::ZERO),
        };

        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::Source { .. }));
    }
}
