//! `roster writer`

use roster_pipeline::config::WriterConfig;
use tracing::info;

use crate::error::Result;

/// Only returns with the error that stopped the consumer
pub async fn run() -> Result<()> {
    let config = WriterConfig::from_env()?;
    info!(ack_mode = ?config.ack_mode, queue = %config.broker.queue, "Starting writer");

    match roster_pipeline::writer::run(&config).await {
        Ok(never) => match never {},
        Err(e) => Err(e.into()),
    }
}
