//! Container helpers for pipeline integration tests
//!
//! Each test gets its own PostgreSQL and RabbitMQ containers, so queue state
//! and table contents never leak between tests.

#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use roster_common::db::DatabaseConfig;
use roster_common::RetryPolicy;
use roster_pipeline::config::BrokerConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::rabbitmq::RabbitMq;
use tracing::info;

/// Short retry budget for tests; containers are already up
pub fn test_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(500))
}

pub struct TestPostgres {
    container: ContainerAsync<Postgres>,
    pool: PgPool,
    config: DatabaseConfig,
}

impl TestPostgres {
    /// Start PostgreSQL and apply migrations
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let config = DatabaseConfig {
            host: host.to_string(),
            port,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            dbname: "postgres".to_string(),
        };

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(config.connect_options())
            .await
            .context("Failed to connect to PostgreSQL")?;

        roster_common::db::MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            container,
            pool,
            config,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> DatabaseConfig {
        self.config.clone()
    }
}

pub struct TestRabbitMq {
    container: ContainerAsync<RabbitMq>,
    config: BrokerConfig,
}

impl TestRabbitMq {
    pub async fn start() -> Result<Self> {
        info!("Starting RabbitMQ test container...");

        let container = RabbitMq::default()
            .start()
            .await
            .context("Failed to start RabbitMQ container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5672.tcp())
            .await
            .context("Failed to get container port")?;

        let config = BrokerConfig {
            host: host.to_string(),
            port,
            ..Default::default()
        };

        Ok(Self { container, config })
    }

    pub fn config(&self) -> BrokerConfig {
        self.config.clone()
    }
}
