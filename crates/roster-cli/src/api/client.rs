//! HTTP client for the students API

use std::time::Duration;

use reqwest::Client;
use roster_common::Student;

use crate::error::{CliError, Result};

/// Default timeout for API requests in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

pub struct StudentsClient {
    client: Client,
}

impl StudentsClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(timeout_from_env()?).build()?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body as a JSON array of students
    pub async fn fetch_students(&self, url: &str) -> Result<Vec<Student>> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let students: Vec<Student> = serde_json::from_slice(&body)?;
        tracing::debug!(url, count = students.len(), "Fetched students");
        Ok(students)
    }
}

/// Request timeout from `API_TIMEOUT_SECS`, in whole seconds
fn timeout_from_env() -> Result<Duration> {
    let secs = match std::env::var("API_TIMEOUT_SECS") {
        Ok(value) => value
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                CliError::Config(format!("API_TIMEOUT_SECS is not a positive number: {}", value))
            })?,
        Err(_) => DEFAULT_API_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}
