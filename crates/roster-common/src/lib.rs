//! Roster Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the roster workspace.
//!
//! # Overview
//!
//! - **Student**: the record moved from file to queue to database
//! - **Retry**: bounded, fixed-delay connection establishment
//! - **Database**: PostgreSQL settings and connection helpers
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use roster_common::Student;
//!
//! let student = Student::from_line("1,Alice,CS").unwrap();
//! assert_eq!(student.id, 1);
//! ```

pub mod db;
pub mod error;
pub mod logging;
pub mod retry;
pub mod student;

// Re-export commonly used types
pub use error::{Result, RosterError};
pub use retry::{connect_with_retry, RetryError, RetryPolicy};
pub use student::{LineError, Student};
