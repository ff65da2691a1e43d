//! Roster Pipeline Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Moves student records from a flat file into PostgreSQL through RabbitMQ.
//!
//! # Flow
//!
//! ```text
//! file -> source -> producer -> queue -> consumer -> Student table
//! ```
//!
//! - [`reader::run`] loads the file, publishes one message per record and exits.
//! - [`writer::run`] consumes the queue and inserts every record until a fatal
//!   error (persistence failure, broker gone) or external termination.
//!
//! Both ends open their broker session and database connection through
//! [`roster_common::connect_with_retry`].
//!
//! # Example
//!
//! ```no_run
//! use roster_pipeline::{config::ReaderConfig, reader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReaderConfig::from_env()?;
//!     let published = reader::run(&config).await?;
//!     println!("published {published} students");
//!     Ok(())
//! }
//! ```

pub mod broker;
pub mod config;
pub mod consumer;
pub mod error;
pub mod producer;
pub mod reader;
pub mod source;
pub mod store;
pub mod writer;

pub use error::{PipelineError, Result};
