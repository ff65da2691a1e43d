//! PostgreSQL connection settings and helpers
//!
//! The writer holds a single [`PgConnection`] for its whole life; the REST
//! service uses a pool. Both are opened through [`connect_with_retry`], and an
//! attempt only counts as successful once the server answered a ping.

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgConnection};

use crate::error::{Result, RosterError};
use crate::retry::{connect_with_retry, RetryPolicy};

/// Default database host.
pub const DEFAULT_DATABASE_HOST: &str = "localhost";

/// Default database port.
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Default database user.
pub const DEFAULT_DATABASE_USER: &str = "postgres";

/// Default database name.
pub const DEFAULT_DATABASE_DBNAME: &str = "postgres";

/// Resource name used in connection logs
const RESOURCE: &str = "PostgreSQL";

/// Schema of the `Student` table.
///
/// The services expect the table to exist and never migrate; test harnesses
/// apply this to their throwaway databases.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DATABASE_HOST.to_string(),
            port: DEFAULT_DATABASE_PORT,
            user: DEFAULT_DATABASE_USER.to_string(),
            password: String::new(),
            dbname: DEFAULT_DATABASE_DBNAME.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Load from `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_USER`,
    /// `DATABASE_PASSWORD` and `DATABASE_DBNAME`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("DATABASE_PORT") {
            Ok(value) => value.parse().map_err(|_| {
                RosterError::config(format!("DATABASE_PORT is not a valid port: {}", value))
            })?,
            Err(_) => defaults.port,
        };

        let config = Self {
            host: std::env::var("DATABASE_HOST").unwrap_or(defaults.host),
            port,
            user: std::env::var("DATABASE_USER").unwrap_or(defaults.user),
            password: std::env::var("DATABASE_PASSWORD").unwrap_or(defaults.password),
            dbname: std::env::var("DATABASE_DBNAME").unwrap_or(defaults.dbname),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RosterError::config("DATABASE_HOST cannot be empty"));
        }
        if self.port == 0 {
            return Err(RosterError::config("DATABASE_PORT must be greater than 0"));
        }
        if self.dbname.is_empty() {
            return Err(RosterError::config("DATABASE_DBNAME cannot be empty"));
        }
        Ok(())
    }

    /// Connection options with TLS disabled
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(PgSslMode::Disable)
    }
}

/// Open one verified connection, retrying per `policy`
pub async fn connect(config: &DatabaseConfig, policy: &RetryPolicy) -> Result<PgConnection> {
    let options = config.connect_options();

    let conn = connect_with_retry(policy, RESOURCE, |_| {
        let options = options.clone();
        async move {
            let mut conn = PgConnection::connect_with(&options).await?;
            conn.ping().await?;
            Ok::<_, sqlx::Error>(conn)
        }
    })
    .await?;

    Ok(conn)
}

/// Open a pool whose first connection is verified, retrying per `policy`
pub async fn connect_pool(
    config: &DatabaseConfig,
    policy: &RetryPolicy,
    max_connections: u32,
) -> Result<PgPool> {
    let options = config.connect_options();

    let pool = connect_with_retry(policy, RESOURCE, |_| {
        let options = options.clone();
        async move {
            PgPoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await
        }
    })
    .await?;

    tracing::info!(max_connections, "Database connection pool created");
    Ok(pool)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "DATABASE_HOST",
        "DATABASE_PORT",
        "DATABASE_USER",
        "DATABASE_PASSWORD",
        "DATABASE_DBNAME",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        std::env::set_var("DATABASE_HOST", "db");
        std::env::set_var("DATABASE_PORT", "6543");
        std::env::set_var("DATABASE_USER", "writer");
        std::env::set_var("DATABASE_PASSWORD", "s3cret");
        std::env::set_var("DATABASE_DBNAME", "school");

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(
            config,
            DatabaseConfig {
                host: "db".to_string(),
                port: 6543,
                user: "writer".to_string(),
                password: "s3cret".to_string(),
                dbname: "school".to_string(),
            }
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_from_env_invalid_port() {
        clear_env();
        std::env::set_var("DATABASE_PORT", "not-a-port");
        assert!(DatabaseConfig::from_env().is_err());

        std::env::set_var("DATABASE_PORT", "0");
        assert!(DatabaseConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_connect_options() {
        let config = DatabaseConfig {
            host: "db".to_string(),
            port: 6543,
            user: "writer".to_string(),
            password: "p@ss:word".to_string(),
            dbname: "school".to_string(),
        };

        let options = config.connect_options();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "writer");
        assert_eq!(options.get_database(), Some("school"));
    }
}
