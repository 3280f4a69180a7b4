//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Row decode and CSV read failures               │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  tally-interchange errors                                              │
//! │  └── InterchangeError - Whole-operation failures                       │
//! │                                                                         │
//! │  Row-level failures never escape an import: they are rendered to       │
//! │  "Row <n>: <message>" and collected in the outcome.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `sale_date` is not a `YYYY-MM-DD` date.
    ///
    /// The message carries the raw cell value exactly as it appeared in
    /// the file, so users can find the offending row.
    #[error("Invalid date format in sale_date: {0}")]
    InvalidSaleDate(String),

    /// The CSV reader rejected the input (bad UTF-8, I/O on the buffer).
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing a CSV buffer failed.
    #[error("CSV write error: {0}")]
    CsvWrite(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Date range with start after end.
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidSaleDate("31/12/2024".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid date format in sale_date: 31/12/2024"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::InvertedRange {
            start: "2024-02-01".to_string(),
            end: "2024-01-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "start date 2024-02-01 is after end date 2024-01-01"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
