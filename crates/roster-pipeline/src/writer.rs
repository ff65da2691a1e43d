//! Writer end: queue to database, until something fatal happens

use std::convert::Infallible;

use futures::StreamExt;
use roster_common::db;
use tracing::info;

use crate::broker::BrokerSession;
use crate::config::WriterConfig;
use crate::consumer;
use crate::error::{PipelineError, Result};
use crate::store::PgStudentStore;

/// Connect to the broker and the database, then consume forever.
///
/// Only returns with the fatal error that stopped consumption. Both handles
/// are closed before returning.
pub async fn run(config: &WriterConfig) -> Result<Infallible> {
    let session = BrokerSession::open(&config.broker, &config.retry).await?;

    let conn = match db::connect(&config.database, &config.retry).await {
        Ok(conn) => conn,
        Err(e) => {
            session.close().await;
            return Err(e.into());
        },
    };

    let deliveries = match session.consume(config.ack_mode).await {
        Ok(consumer) => consumer,
        Err(e) => {
            session.close().await;
            return Err(e);
        },
    };

    let mut store = PgStudentStore::new(conn);

    info!(
        queue = %session.queue_name(),
        "Waiting for messages. To exit press CTRL+C"
    );

    let result = consumer::run(
        deliveries.map(|delivery| delivery.map_err(PipelineError::from)),
        &mut store,
        config.ack_mode,
    )
    .await;

    store.close().await;
    session.close().await;
    result
}
