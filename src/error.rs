//! Custom error types for cyclebook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for cyclebook operations
#[derive(Error, Debug)]
pub enum CycleError {
    /// Malformed static configuration, fatal at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Transaction rejected at the creation boundary
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Date range whose start lies after its end
    #[error("Invalid date range: start {start} is after end {end}")]
    OutOfRangeQuery { start: NaiveDate, end: NaiveDate },

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl CycleError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error comes from a malformed configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

impl From<std::io::Error> for CycleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CycleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for cyclebook operations
pub type CycleResult<T> = Result<T, CycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CycleError::InvalidConfiguration("reset_day_old must be within 1-28".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: reset_day_old must be within 1-28"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_not_found_error() {
        let err = CycleError::transaction_not_found("txn-1234abcd");
        assert_eq!(err.to_string(), "Transaction not found: txn-1234abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_out_of_range_display() {
        let err = CycleError::OutOfRangeQuery {
            start: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: start 2025-03-10 is after end 2025-03-01"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CycleError = io_err.into();
        assert!(matches!(err, CycleError::Io(_)));
    }
}
