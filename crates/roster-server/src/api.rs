//! Router assembly and server lifecycle

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use roster_common::db;
use sqlx::PgPool;
use tokio::signal;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ServerResult;
use crate::{features, middleware};

/// Create the application router with all routes and middleware
pub fn create_router(pool: PgPool) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(features::router())
        .with_state(pool)
        .layer(middleware::tracing_layer())
}

/// Liveness check; does not touch the database
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Connect the pool, bind, and serve until Ctrl+C or SIGTERM.
///
/// After the signal, in-flight requests get up to
/// `shutdown_timeout_secs` to finish before the server is dropped.
pub async fn serve(config: Config) -> ServerResult<()> {
    let pool = db::connect_pool(
        &config.database,
        &config.retry,
        config.server.max_connections,
    )
    .await?;

    let app = create_router(pool.clone());

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(async move { server.await });

    let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let drain_deadline = async move {
        if signalled_rx.await.is_ok() {
            info!("Waiting up to {} seconds for connections to close", timeout.as_secs());
            tokio::time::sleep(timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = &mut server => {
            match result {
                Ok(served) => served?,
                Err(e) => warn!("Server task failed: {}", e),
            }
        },
        _ = drain_deadline => {
            warn!("Shutdown timeout elapsed, dropping open connections");
            server.abort();
        },
    }

    pool.close().await;
    info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
