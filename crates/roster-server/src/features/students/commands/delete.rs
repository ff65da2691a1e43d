use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Only the id is read from the body; other fields are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteStudentCommand {
    #[serde(default)]
    pub id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteStudentResponse {
    pub message: String,
}

impl Default for DeleteStudentResponse {
    fn default() -> Self {
        Self {
            message: "Student deleted successfully".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteStudentError {
    #[error("Student ID is required")]
    IdRequired,
    #[error("Student not found")]
    NotFound(i32),
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl DeleteStudentCommand {
    pub fn validate(&self) -> Result<(), DeleteStudentError> {
        if self.id == 0 {
            return Err(DeleteStudentError::IdRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: DeleteStudentCommand,
) -> Result<DeleteStudentResponse, DeleteStudentError> {
    command.validate()?;

    let result = sqlx::query("DELETE FROM Student WHERE id = $1")
        .bind(command.id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteStudentError::NotFound(command.id));
    }

    Ok(DeleteStudentResponse::default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_success() {
        let cmd = DeleteStudentCommand { id: 3 };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_id() {
        let cmd = DeleteStudentCommand { id: 0 };
        assert!(matches!(cmd.validate(), Err(DeleteStudentError::IdRequired)));
    }

    #[test]
    fn test_body_extra_fields_ignored() {
        let cmd: DeleteStudentCommand =
            serde_json::from_str(r#"{"id":3,"name":"Carol","major":"Physics"}"#).unwrap();
        assert_eq!(cmd.id, 3);
    }

    #[sqlx::test(migrator = "roster_common::db::MIGRATOR")]
    #[ignore] // Requires database
    async fn test_handle_deletes_student(pool: PgPool) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO Student (id, name, major) VALUES (3, 'Carol', 'Physics')")
            .execute(&pool)
            .await?;

        let response = handle(pool.clone(), DeleteStudentCommand { id: 3 })
            .await
            .unwrap();
        assert_eq!(response.message, "Student deleted successfully");

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Student")
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[sqlx::test(migrator = "roster_common::db::MIGRATOR")]
    #[ignore] // Requires database
    async fn test_handle_not_found(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(pool.clone(), DeleteStudentCommand { id: 3 }).await;
        assert!(matches!(result, Err(DeleteStudentError::NotFound(3))));
        Ok(())
    }
}
