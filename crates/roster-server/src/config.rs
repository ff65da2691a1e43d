//! Configuration management

use roster_common::db::DatabaseConfig;
use roster_common::RetryPolicy;

use crate::error::{ServerError, ServerResult};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub retry: RetryPolicy,
}

/// Server-specific configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> ServerResult<T> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ServerError::Config(format!("{} has an invalid value: {}", name, value))),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    /// Load from `STUDENTS_HOST`, `STUDENTS_PORT`, `STUDENTS_SHUTDOWN_TIMEOUT`
    /// and `DATABASE_MAX_CONNECTIONS`
    pub fn from_env() -> ServerResult<Self> {
        let config = Self {
            host: std::env::var("STUDENTS_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env_parse("STUDENTS_PORT", DEFAULT_SERVER_PORT)?,
            shutdown_timeout_secs: env_parse(
                "STUDENTS_SHUTDOWN_TIMEOUT",
                DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            )?,
            max_connections: env_parse(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.host.is_empty() {
            return Err(ServerError::Config("STUDENTS_HOST cannot be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ServerError::Config(
                "DATABASE_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> ServerResult<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            retry: RetryPolicy::from_env()?,
        })
    }
}
