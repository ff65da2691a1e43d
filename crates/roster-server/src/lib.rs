//! Roster Server Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! REST API over the `Student` table.
//!
//! # Routes
//!
//! | Method | Path        | Purpose                                   |
//! |--------|-------------|-------------------------------------------|
//! | GET    | `/health`   | liveness, empty 200                       |
//! | GET    | `/students` | every student                             |
//! | GET    | `/student`  | lookup by `id`, `name` or `major`         |
//! | POST   | `/students` | create from a JSON body                   |
//! | PUT    | `/students` | update name and major by id               |
//! | DELETE | `/students` | delete by id from a JSON body             |
//!
//! Errors are flat JSON objects: `{"error": ".."}` for client and server
//! failures, `{"message": ".."}` for lookups that found nothing.
//!
//! # Architecture
//!
//! The `students` feature is a vertical slice: `commands/` for writes,
//! `queries/` for reads and `routes.rs` wiring both to axum. Handlers share a
//! single [`sqlx::PgPool`].
//!
//! # Example
//!
//! ```no_run
//! use roster_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, ServerError, ServerResult};
