//! Reader and writer configuration
//!
//! Everything comes from the environment. A `.env` file in the working
//! directory is loaded first when present.

use std::path::PathBuf;
use std::str::FromStr;

use lapin::uri::{AMQPAuthority, AMQPUri, AMQPUserInfo};
use roster_common::db::DatabaseConfig;
use roster_common::RetryPolicy;

use crate::error::{PipelineError, Result};

/// Default broker host.
pub const DEFAULT_RABBITMQ_HOST: &str = "localhost";

/// Default broker port.
pub const DEFAULT_RABBITMQ_PORT: u16 = 5672;

/// Default broker credentials.
pub const DEFAULT_RABBITMQ_USER: &str = "guest";
pub const DEFAULT_RABBITMQ_PASSWORD: &str = "guest";

/// Default virtual host.
pub const DEFAULT_RABBITMQ_VHOST: &str = "/";

/// Queue shared by the reader and the writer.
pub const DEFAULT_QUEUE_NAME: &str = "student_messages";

/// Default location of the student file.
pub const DEFAULT_STUDENT_FILE_PATH: &str = "./TestFile/studentInfoproducer.txt";

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| PipelineError::config(format!("{} has an invalid value: {}", name, value))),
        Err(_) => Ok(default),
    }
}

/// RabbitMQ connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub vhost: String,
    pub queue: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RABBITMQ_HOST.to_string(),
            port: DEFAULT_RABBITMQ_PORT,
            user: DEFAULT_RABBITMQ_USER.to_string(),
            password: DEFAULT_RABBITMQ_PASSWORD.to_string(),
            vhost: DEFAULT_RABBITMQ_VHOST.to_string(),
            queue: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

impl BrokerConfig {
    /// Load from `RABBITMQ_HOST`, `RABBITMQ_PORT`, `RABBITMQ_USER`,
    /// `RABBITMQ_PASSWORD`, `RABBITMQ_VHOST` and `RABBITMQ_QUEUE`
    pub fn from_env() -> Result<Self> {
        let config = Self {
            host: env_or("RABBITMQ_HOST", DEFAULT_RABBITMQ_HOST),
            port: env_parse("RABBITMQ_PORT", DEFAULT_RABBITMQ_PORT)?,
            user: env_or("RABBITMQ_USER", DEFAULT_RABBITMQ_USER),
            password: env_or("RABBITMQ_PASSWORD", DEFAULT_RABBITMQ_PASSWORD),
            vhost: env_or("RABBITMQ_VHOST", DEFAULT_RABBITMQ_VHOST),
            queue: env_or("RABBITMQ_QUEUE", DEFAULT_QUEUE_NAME),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(PipelineError::config("RABBITMQ_HOST cannot be empty"));
        }
        if self.port == 0 {
            return Err(PipelineError::config("RABBITMQ_PORT must be greater than 0"));
        }
        if self.queue.is_empty() {
            return Err(PipelineError::config("RABBITMQ_QUEUE cannot be empty"));
        }
        Ok(())
    }

    /// Structured AMQP URI, so credentials never need escaping
    pub fn amqp_uri(&self) -> AMQPUri {
        AMQPUri {
            authority: AMQPAuthority {
                userinfo: AMQPUserInfo {
                    username: self.user.clone(),
                    password: self.password.clone(),
                },
                host: self.host.clone(),
                port: self.port,
            },
            vhost: self.vhost.clone(),
            ..Default::default()
        }
    }

    /// `host:port/vhost` without credentials, for logs
    pub fn endpoint(&self) -> String {
        format!("{}:{}{}", self.host, self.port, display_vhost(&self.vhost))
    }
}

fn display_vhost(vhost: &str) -> String {
    if vhost.starts_with('/') {
        vhost.to_string()
    } else {
        format!("/{}", vhost)
    }
}

/// When the writer acknowledges a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    /// The broker considers a message delivered once it is handed out
    #[default]
    Auto,
    /// Ack only after the row is committed; malformed messages are acked and dropped
    AfterPersist,
}

impl AckMode {
    /// `no_ack` flag for `basic.consume`
    pub fn no_ack(self) -> bool {
        self == AckMode::Auto
    }
}

impl FromStr for AckMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(AckMode::Auto),
            "after-persist" | "after_persist" | "manual" => Ok(AckMode::AfterPersist),
            _ => Err(format!("Invalid ack mode: {}", s)),
        }
    }
}

/// Settings for the reader end
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub source_path: PathBuf,
    pub broker: BrokerConfig,
    pub retry: RetryPolicy,
}

impl ReaderConfig {
    /// Load from the environment (`STUDENT_FILE_PATH` plus broker and retry settings)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            source_path: PathBuf::from(env_or("STUDENT_FILE_PATH", DEFAULT_STUDENT_FILE_PATH)),
            broker: BrokerConfig::from_env()?,
            retry: RetryPolicy::from_env()?,
        })
    }
}

/// Settings for the writer end
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub broker: BrokerConfig,
    pub database: DatabaseConfig,
    pub retry: RetryPolicy,
    pub ack_mode: AckMode,
}

impl WriterConfig {
    /// Load from the environment (`WRITER_ACK_MODE` plus broker, database and retry settings)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            broker: BrokerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            retry: RetryPolicy::from_env()?,
            ack_mode: env_parse("WRITER_ACK_MODE", AckMode::default())?,
        })
    }
}
