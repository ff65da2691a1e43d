//! The student record
//!
//! A `Student` is the unit of transfer: it is parsed from one line of the
//! source file, published as one JSON message, and stored as one row of the
//! `Student` table.
//!
//! # Line Format
//! ```text
//! id,name,major
//! 1,Alice,CS
//! ```
//! Exactly three comma-separated fields, no quoting. The name and major are
//! kept verbatim, including surrounding whitespace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field separator used by the source file format
pub const FIELD_SEPARATOR: char = ',';

/// Number of fields in a source line
pub const FIELD_COUNT: usize = 3;

/// A student record (`{"id": 1, "name": "Alice", "major": "CS"}` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub major: String,
}

/// Why a source line could not be turned into a `Student`
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LineError {
    #[error("expected {expected} fields, got {0}", expected = FIELD_COUNT)]
    FieldCount(usize),

    #[error("invalid id '{value}': {reason}")]
    InvalidId { value: String, reason: String },
}

impl Student {
    pub fn new(id: i32, name: impl Into<String>, major: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            major: major.into(),
        }
    }

    /// Parse a single source line.
    pub fn from_line(line: &str) -> Result<Self, LineError> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [id, name, major] = fields.as_slice() else {
            return Err(LineError::FieldCount(fields.len()));
        };

        let id = id.parse::<i32>().map_err(|e| LineError::InvalidId {
            value: (*id).to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(id, *name, *major))
    }

    /// Render the record the way the analyser writes it: `id, name, major`.
    pub fn to_report_line(&self) -> String {
        [self.id.to_string(), self.name.clone(), self.major.clone()].join(", ")
    }

    /// Serialize to the queue payload.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Deserialize a queue payload.
    pub fn from_payload(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let student = Student::from_line("1,Alice,CS").unwrap();
        assert_eq!(student, Student::new(1, "Alice", "CS"));
    }

    #[test]
    fn test_parse_keeps_fields_verbatim() {
        let student = Student::from_line("42, Bob ,").unwrap();
        assert_eq!(student.id, 42);
        assert_eq!(student.name, " Bob ");
        assert_eq!(student.major, "");
    }

    #[test]
    fn test_parse_negative_id() {
        let student = Student::from_line("-7,Eve,Law").unwrap();
        assert_eq!(student.id, -7);
    }

    #[test]
    fn test_parse_wrong_field_count() {
        assert_eq!(Student::from_line("badline"), Err(LineError::FieldCount(1)));
        assert_eq!(Student::from_line("1,Alice"), Err(LineError::FieldCount(2)));
        assert_eq!(
            Student::from_line("1,Alice,CS,extra"),
            Err(LineError::FieldCount(4))
        );
        assert_eq!(Student::from_line(""), Err(LineError::FieldCount(1)));
        assert_eq!(
            LineError::FieldCount(2).to_string(),
            format!("expected {FIELD_COUNT} fields, got 2")
        );
    }

    #[test]
    fn test_parse_invalid_id() {
        assert!(matches!(
            Student::from_line("abc,Alice,CS"),
            Err(LineError::InvalidId { ref value, .. }) if value == "abc"
        ));
        // Whitespace around the id is not tolerated
        assert!(matches!(
            Student::from_line(" 1,Alice,CS"),
            Err(LineError::InvalidId { .. })
        ));
        // Out of range for the INTEGER column
        assert!(matches!(
            Student::from_line("99999999999,Alice,CS"),
            Err(LineError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_payload_round_trip() {
        let student = Student::new(3, "Carol, Jr.", "Physics \"honours\"");
        let payload = student.to_payload().unwrap();
        assert_eq!(Student::from_payload(&payload).unwrap(), student);
    }

    #[test]
    fn test_payload_field_names() {
        let payload = Student::new(1, "Alice", "CS").to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value, serde_json::json!({"id": 1, "name": "Alice", "major": "CS"}));
    }

    #[test]
    fn test_payload_rejects_garbage() {
        assert!(Student::from_payload(b"not json").is_err());
        assert!(Student::from_payload(br#"{"id":"one","name":"A","major":"B"}"#).is_err());
    }

    #[test]
    fn test_report_line() {
        assert_eq!(Student::new(2, "Bob", "Math").to_report_line(), "2, Bob, Math");
    }
}
