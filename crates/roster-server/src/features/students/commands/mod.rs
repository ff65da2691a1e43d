pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateStudentCommand, CreateStudentError};
pub use delete::{DeleteStudentCommand, DeleteStudentError, DeleteStudentResponse};
pub use update::{UpdateStudentCommand, UpdateStudentError};
