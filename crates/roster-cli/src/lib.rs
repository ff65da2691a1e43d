//! Roster CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! One binary, four roles:
//!
//! - `roster reader` - publish the student file to the queue, then exit
//! - `roster writer` - consume the queue into the `Student` table
//! - `roster students` - serve the REST API
//! - `roster analyser` - dump the REST API's student list into a file
//!
//! Every role reads its settings from the environment (and `.env`).

pub mod api;
pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Args, Parser, Subcommand};

/// Student record pipeline and API
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Role to run
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available roles
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish every record of the student file to the queue
    Reader,

    /// Consume the queue and insert each student into PostgreSQL
    Writer,

    /// Serve the students REST API
    Students,

    /// Fetch all students from the API and write them to a file
    Analyser(AnalyserArgs),
}

/// Analyser settings; flags override the environment
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AnalyserArgs {
    /// API host
    #[arg(long, env = "API_HOST", default_value = "localhost")]
    pub api_host: String,

    /// API port
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub api_port: u16,

    /// Endpoint path returning a JSON array of students
    #[arg(long, env = "API_ENDPOINT", default_value = "students")]
    pub api_endpoint: String,

    /// Output file
    #[arg(long, env = "FILE_PATH", default_value = "./TestFile/studentInfoanalyser.txt")]
    pub file_path: std::path::PathBuf,
}

impl AnalyserArgs {
    /// `http://host:port/endpoint`
    pub fn url(&self) -> String {
        format!(
            "http://{}:{}/{}",
            self.api_host,
            self.api_port,
            self.api_endpoint.trim_start_matches('/')
        )
    }
}
