//! Fatal import errors
//!
//! Per-row problems are never errors; they become
//! [`RowRejection`](crate::models::RowRejection) entries. These variants abort
//! the whole import.

use thiserror::Error;

use crate::models::RowRejection;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    /// Fewer than two non-blank lines (no header, or header without data)
    #[error("File must contain a header row and at least one data row (found {lines} non-blank line(s))")]
    EmptyInput { lines: usize },

    /// No header maps to the identity column
    #[error("Missing required column: expected one of [{}]; found headers [{}]", .expected.join(", "), .found.join(", "))]
    MissingRequiredColumn {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Every data row was rejected
    #[error("No valid records found ({} row(s) rejected)", .rejected.len())]
    NoValidRecords { rejected: Vec<RowRejection> },
}

impl ImportError {
    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::EmptyInput { .. } => "EMPTY_INPUT",
            ImportError::MissingRequiredColumn { .. } => "MISSING_REQUIRED_COLUMN",
            ImportError::NoValidRecords { .. } => "NO_VALID_RECORDS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_lists_headers() {
        let err = ImportError::MissingRequiredColumn {
            expected: vec!["name".to_string()],
            found: vec!["email".to_string(), "city".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("[name]"));
        assert!(message.contains("[email, city]"));
        assert_eq!(err.code(), "MISSING_REQUIRED_COLUMN");
    }

    #[test]
    fn test_no_valid_records_counts_rows() {
        let err = ImportError::NoValidRecords {
            rejected: vec![RowRejection::new(2, "Missing name"), RowRejection::new(3, "Missing name")],
        };
        assert_eq!(err.to_string(), "No valid records found (2 row(s) rejected)");
    }
}
