pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateStudentCommand, CreateStudentError, DeleteStudentCommand, DeleteStudentError,
    DeleteStudentResponse, UpdateStudentCommand, UpdateStudentError,
};

pub use queries::{
    GetStudentError, GetStudentQuery, ListStudentsError, ListStudentsQuery, StudentFilter,
};

pub use routes::students_routes;
