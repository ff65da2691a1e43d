use roster_common::Student;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentCommand {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub major: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateStudentError {
    #[error("Student ID is required")]
    IdRequired,
    #[error("Student not found")]
    NotFound(i32),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl UpdateStudentCommand {
    pub fn validate(&self) -> Result<(), UpdateStudentError> {
        if self.id == 0 {
            return Err(UpdateStudentError::IdRequired);
        }
        Ok(())
    }
}

/// Overwrite name and major of an existing student.
///
/// Zero affected rows is reported as `NotFound`, which also covers an update
/// that raced with a delete.
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: UpdateStudentCommand,
) -> Result<Student, UpdateStudentError> {
    command.validate()?;

    let result = sqlx::query("UPDATE Student SET name = $2, major = $3 WHERE id = $1")
        .bind(command.id)
        .bind(&command.name)
        .bind(&command.major)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UpdateStudentError::NotFound(command.id));
    }

    Ok(Student::new(command.id, command.name, command.major))
}
