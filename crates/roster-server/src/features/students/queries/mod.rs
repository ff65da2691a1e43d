pub mod get;
pub mod list;

pub use get::{GetStudentError, GetStudentQuery};
pub use list::{ListStudentsError, ListStudentsQuery, StudentFilter};
