//! Persistence for consumed students

use async_trait::async_trait;
use roster_common::Student;
use sqlx::{Connection, PgConnection};
use tracing::warn;

/// Insert statement for one record
pub const INSERT_STUDENT: &str = "INSERT INTO Student (id, name, major) VALUES ($1, $2, $3)";

/// Destination for consumed records
#[async_trait]
pub trait StudentStore: Send {
    async fn insert(&mut self, student: &Student) -> Result<(), sqlx::Error>;
}

/// Stores records through a single long-lived connection
pub struct PgStudentStore {
    conn: PgConnection,
}

impl PgStudentStore {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "Failed to close database connection");
        }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn insert(&mut self, student: &Student) -> Result<(), sqlx::Error> {
        sqlx::query(INSERT_STUDENT)
            .bind(student.id)
            .bind(&student.name)
            .bind(&student.major)
            .execute(&mut self.conn)
            .await?;
        Ok(())
    }
}
