//! `roster reader`

use roster_pipeline::config::ReaderConfig;
use tracing::info;

use crate::error::Result;

pub async fn run() -> Result<()> {
    let config = ReaderConfig::from_env()?;
    info!(path = %config.source_path.display(), "Starting reader");

    let published = roster_pipeline::reader::run(&config).await?;
    info!(published, "Reader done");
    Ok(())
}
