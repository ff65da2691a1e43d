use roster_common::Student;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStudentQuery {
    pub id: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum GetStudentError {
    #[error("Student not found")]
    NotFound(i32),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetStudentQuery) -> Result<Student, GetStudentError> {
    sqlx::query_as::<_, Student>("SELECT id, name, major FROM Student WHERE id = $1")
        .bind(query.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(GetStudentError::NotFound(query.id))
}
