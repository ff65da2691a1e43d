//! `roster analyser`: API to file
//!
//! Each student becomes one `id, name, major` line. The output file is only
//! created after the API answered with a valid list.

use std::path::Path;

use roster_common::Student;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::api::StudentsClient;
use crate::error::{CliError, Result};
use crate::AnalyserArgs;

pub async fn run(args: &AnalyserArgs) -> Result<()> {
    let url = args.url();
    info!(%url, "Fetching students");

    let client = StudentsClient::new()?;
    let students = client.fetch_students(&url).await?;

    write_report(&students, &args.file_path).await?;

    info!(path = %args.file_path.display(), count = students.len(), "Data successfully written to file");
    Ok(())
}

/// Create or truncate `path` and write one line per student
pub async fn write_report(students: &[Student], path: &Path) -> Result<()> {
    let output_error = |source| CliError::Output {
        path: path.display().to_string(),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(output_error)?;

    for student in students {
        info!(
            student_id = student.id,
            name = %student.name,
            major = %student.major,
            "Student details read successfully"
        );

        let line = format!("{}\n", student.to_report_line());
        file.write_all(line.as_bytes()).await.map_err(output_error)?;
    }

    file.flush().await.map_err(output_error)?;
    Ok(())
}
