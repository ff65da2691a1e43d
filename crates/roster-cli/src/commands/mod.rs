//! One module per role

pub mod analyser;
pub mod reader;
pub mod students;
pub mod writer;
