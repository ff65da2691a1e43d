//! Student API routes
//!
//! # Route Structure
//!
//! - `GET /students` - List every student
//! - `GET /student?id=N` | `?name=X` | `?major=X` - Look up students
//! - `POST /students` - Create a student
//! - `PUT /students` - Update a student
//! - `DELETE /students` - Delete a student (id taken from the JSON body)
//!
//! # Examples
//!
//! ```rust,ignore
//! use axum::Router;
//! use roster_server::features::students::routes::students_routes;
//!
//! let app = Router::new().merge(students_routes()).with_state(pool);
//! ```

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize};
use sqlx::PgPool;

use super::{
    commands::{
        CreateStudentCommand, CreateStudentError, DeleteStudentCommand, DeleteStudentError,
        UpdateStudentCommand, UpdateStudentError,
    },
    queries::{
        GetStudentError, GetStudentQuery, ListStudentsError, ListStudentsQuery, StudentFilter,
    },
};
use crate::error::AppError;

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the students router with all routes configured
pub fn students_routes() -> Router<PgPool> {
    Router::new()
        .route(
            "/students",
            get(list_students)
                .post(create_student)
                .put(update_student)
                .delete(delete_student),
        )
        .route("/student", get(find_students))
}

/// Query string of `GET /student`; empty values count as absent
#[derive(Debug, Default, Deserialize)]
pub struct StudentLookupParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub major: Option<String>,
}

/// Resolved lookup, with precedence id > name > major
#[derive(Debug, PartialEq, Eq)]
enum Lookup {
    ById(i32),
    Filtered(StudentFilter),
}

impl StudentLookupParams {
    fn resolve(self) -> Result<Lookup, StudentApiError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        if let Some(id) = present(self.id) {
            let id = id.parse().map_err(|_| StudentApiError::InvalidId)?;
            return Ok(Lookup::ById(id));
        }
        if let Some(name) = present(self.name) {
            return Ok(Lookup::Filtered(StudentFilter::Name(name)));
        }
        if let Some(major) = present(self.major) {
            return Ok(Lookup::Filtered(StudentFilter::Major(major)));
        }
        Ok(Lookup::Filtered(StudentFilter::All))
    }
}

/// Decode a JSON request body regardless of its `Content-Type`
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, StudentApiError> {
    serde_json::from_slice(body).map_err(StudentApiError::InvalidBody)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a student
///
/// # Response
///
/// - `201 Created` - the stored student
/// - `400 Bad Request` - body is not a student, or id is missing/zero
/// - `500 Internal Server Error` - database error (duplicate id included)
#[tracing::instrument(skip(pool, body))]
async fn create_student(
    State(pool): State<PgPool>,
    body: Bytes,
) -> Result<Response, StudentApiError> {
    let command: CreateStudentCommand = decode_body(&body)?;
    let student = super::commands::create::handle(pool, command).await?;

    tracing::info!(student_id = student.id, "Student created via API");

    Ok((StatusCode::CREATED, Json(student)).into_response())
}

/// Update name and major of a student
///
/// # Response
///
/// - `200 OK` - the updated student
/// - `400 Bad Request` - body is not a student, or id is missing/zero
/// - `404 Not Found` - no row with that id
#[tracing::instrument(skip(pool, body))]
async fn update_student(
    State(pool): State<PgPool>,
    body: Bytes,
) -> Result<Response, StudentApiError> {
    let command: UpdateStudentCommand = decode_body(&body)?;
    let student = super::commands::update::handle(pool, command).await?;

    tracing::info!(student_id = student.id, "Student updated via API");

    Ok((StatusCode::OK, Json(student)).into_response())
}

/// Delete a student
///
/// # Response
///
/// - `200 OK` - `{"message": "Student deleted successfully"}`
/// - `400 Bad Request` - body is not valid JSON, or id is missing/zero
/// - `404 Not Found` - no row with that id
#[tracing::instrument(skip(pool, body))]
async fn delete_student(
    State(pool): State<PgPool>,
    body: Bytes,
) -> Result<Response, StudentApiError> {
    let command: DeleteStudentCommand = decode_body(&body)?;
    let student_id = command.id;
    let response = super::commands::delete::handle(pool, command).await?;

    tracing::info!(student_id, "Student deleted via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List every student
#[tracing::instrument(skip(pool))]
async fn list_students(State(pool): State<PgPool>) -> Result<Response, StudentApiError> {
    let students = super::queries::list::handle(pool, ListStudentsQuery::default()).await?;

    tracing::debug!(count = students.len(), "Students listed via API");

    Ok((StatusCode::OK, Json(students)).into_response())
}

/// Look up students by id, name or major
///
/// An id lookup returns one object; name and major lookups return arrays.
/// Without parameters this is the same as `GET /students`.
#[tracing::instrument(skip(pool))]
async fn find_students(
    State(pool): State<PgPool>,
    Query(params): Query<StudentLookupParams>,
) -> Result<Response, StudentApiError> {
    match params.resolve()? {
        Lookup::ById(id) => {
            let student = super::queries::get::handle(pool, GetStudentQuery { id }).await?;
            Ok((StatusCode::OK, Json(student)).into_response())
        },
        Lookup::Filtered(filter) => {
            let students = super::queries::list::handle(pool, ListStudentsQuery { filter }).await?;
            tracing::debug!(count = students.len(), "Students found via API");
            Ok((StatusCode::OK, Json(students)).into_response())
        },
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for student API endpoints
#[derive(Debug)]
pub enum StudentApiError {
    InvalidId,
    InvalidBody(serde_json::Error),
    CreateError(CreateStudentError),
    UpdateError(UpdateStudentError),
    DeleteError(DeleteStudentError),
    GetError(GetStudentError),
    ListError(ListStudentsError),
}

impl From<CreateStudentError> for StudentApiError {
    fn from(err: CreateStudentError) -> Self {
        Self::CreateError(err)
    }
}

impl From<UpdateStudentError> for StudentApiError {
    fn from(err: UpdateStudentError) -> Self {
        Self::UpdateError(err)
    }
}

impl From<DeleteStudentError> for StudentApiError {
    fn from(err: DeleteStudentError) -> Self {
        Self::DeleteError(err)
    }
}

impl From<GetStudentError> for StudentApiError {
    fn from(err: GetStudentError) -> Self {
        Self::GetError(err)
    }
}

impl From<ListStudentsError> for StudentApiError {
    fn from(err: ListStudentsError) -> Self {
        Self::ListError(err)
    }
}

impl From<StudentApiError> for AppError {
    fn from(err: StudentApiError) -> Self {
        match err {
            StudentApiError::InvalidId => AppError::BadRequest("Invalid ID".to_string()),
            StudentApiError::InvalidBody(e) => {
                tracing::debug!(error = %e, "Rejected request body");
                AppError::BadRequest("Invalid request body".to_string())
            },

            StudentApiError::CreateError(e @ CreateStudentError::IdRequired) => {
                AppError::BadRequest(e.to_string())
            },
            StudentApiError::UpdateError(e @ UpdateStudentError::IdRequired) => {
                AppError::BadRequest(e.to_string())
            },
            StudentApiError::DeleteError(e @ DeleteStudentError::IdRequired) => {
                AppError::BadRequest(e.to_string())
            },

            StudentApiError::UpdateError(e @ UpdateStudentError::NotFound(_)) => {
                AppError::NotFound(e.to_string())
            },
            StudentApiError::DeleteError(e @ DeleteStudentError::NotFound(_)) => {
                AppError::NotFound(e.to_string())
            },
            StudentApiError::GetError(e @ GetStudentError::NotFound(_)) => {
                AppError::NotFound(e.to_string())
            },
            StudentApiError::ListError(
                e @ (ListStudentsError::NoneWithName | ListStudentsError::NoneWithMajor),
            ) => AppError::NotFound(e.to_string()),

            StudentApiError::CreateError(CreateStudentError::Database(e))
            | StudentApiError::UpdateError(UpdateStudentError::Database(e))
            | StudentApiError::DeleteError(DeleteStudentError::Database(e))
            | StudentApiError::GetError(GetStudentError::Database(e))
            | StudentApiError::ListError(ListStudentsError::Database(e)) => AppError::from(e),
        }
    }
}

impl IntoResponse for StudentApiError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
