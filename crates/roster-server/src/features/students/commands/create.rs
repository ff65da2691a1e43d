use roster_common::Student;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Missing fields default to zero values; a zero id is rejected by `validate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateStudentCommand {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub major: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateStudentError {
    #[error("Student ID is required")]
    IdRequired,
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl CreateStudentCommand {
    pub fn validate(&self) -> Result<(), CreateStudentError> {
        if self.id == 0 {
            return Err(CreateStudentError::IdRequired);
        }
        Ok(())
    }
}

impl From<CreateStudentCommand> for Student {
    fn from(command: CreateStudentCommand) -> Self {
        Student::new(command.id, command.name, command.major)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: CreateStudentCommand,
) -> Result<Student, CreateStudentError> {
    command.validate()?;

    sqlx::query("INSERT INTO Student (id, name, major) VALUES ($1, $2, $3)")
        .bind(command.id)
        .bind(&command.name)
        .bind(&command.major)
        .execute(&pool)
        .await?;

    Ok(command.into())
}
