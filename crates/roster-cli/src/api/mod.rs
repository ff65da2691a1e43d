//! Client side of the students REST API

pub mod client;

pub use client::StudentsClient;
