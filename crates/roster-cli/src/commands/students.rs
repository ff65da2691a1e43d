//! `roster students`

use roster_server::config::Config;
use tracing::info;

use crate::error::Result;

pub async fn run() -> Result<()> {
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    roster_server::api::serve(config).await?;
    Ok(())
}
