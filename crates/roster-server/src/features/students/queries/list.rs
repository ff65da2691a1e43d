use roster_common::Student;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Which students to return; matching is exact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentFilter {
    #[default]
    All,
    Name(String),
    Major(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListStudentsQuery {
    pub filter: StudentFilter,
}

#[derive(Debug, thiserror::Error)]
pub enum ListStudentsError {
    #[error("No students found with that name")]
    NoneWithName,
    #[error("No students found with that major")]
    NoneWithMajor,
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// List students matching the filter.
///
/// An unfiltered listing may be empty; a filtered one that matches nothing is
/// an error.
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListStudentsQuery,
) -> Result<Vec<Student>, ListStudentsError> {
    let students = match &query.filter {
        StudentFilter::All => {
            sqlx::query_as::<_, Student>("SELECT id, name, major FROM Student ORDER BY id")
                .fetch_all(&pool)
                .await?
        },
        StudentFilter::Name(name) => {
            sqlx::query_as::<_, Student>(
                "SELECT id, name, major FROM Student WHERE name = $1 ORDER BY id",
            )
            .bind(name)
            .fetch_all(&pool)
            .await?
        },
        StudentFilter::Major(major) => {
            sqlx::query_as::<_, Student>(
                "SELECT id, name, major FROM Student WHERE major = $1 ORDER BY id",
            )
            .bind(major)
            .fetch_all(&pool)
            .await?
        },
    };

    if students.is_empty() {
        match query.filter {
            StudentFilter::All => {},
            StudentFilter::Name(_) => return Err(ListStudentsError::NoneWithName),
            StudentFilter::Major(_) => return Err(ListStudentsError::NoneWithMajor),
        }
    }

    Ok(students)
}
