//! Student file source
//!
//! One record per line: `id,name,major`. Lines that do not parse are logged
//! with their 1-based line number and skipped. An unreadable file is fatal.

use std::path::Path;

use roster_common::Student;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};

/// Outcome of parsing a source file
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Parsed {
    /// Valid records, in file order
    pub students: Vec<Student>,
    /// Lines dropped with a warning
    pub skipped: usize,
}

/// Read the whole file and parse it
pub async fn load(path: impl AsRef<Path>) -> Result<Parsed> {
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::Source {
            path: path.to_path_buf(),
            source,
        })?;

    let parsed = parse_lines(&content);
    info!(
        path = %path.display(),
        records = parsed.students.len(),
        skipped = parsed.skipped,
        "Loaded student file"
    );
    Ok(parsed)
}

/// Parse every line in order, dropping the invalid ones
pub fn parse_lines(content: &str) -> Parsed {
    let mut parsed = Parsed::default();

    for (idx, line) in content.lines().enumerate() {
        match Student::from_line(line) {
            Ok(student) => parsed.students.push(student),
            Err(e) => {
                warn!(line_num = idx + 1, line, error = %e, "Skipping invalid line");
                parsed.skipped += 1;
            },
        }
    }

    parsed
}
