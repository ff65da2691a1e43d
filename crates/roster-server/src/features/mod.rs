//! Feature modules implementing the roster API
//!
//! Each feature is a vertical slice:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions

pub mod students;

use axum::Router;
use sqlx::PgPool;

/// Creates the API router with all feature routes mounted
pub fn router() -> Router<PgPool> {
    Router::new().merge(students::students_routes())
}
