//! # Interchange Error Types
//!
//! Errors that abort a whole import, export or job operation.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Interchange Error Categories                         │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Lookup       │  │     Storage             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  CompanyNotFound│  │  Database (DbError)     │ │
//! │  │  ConfigLoad     │  │  JobNotFound    │  │  Transaction            │ │
//! │  │  ConfigSave     │  │  JobNotFinished │  │  Io                     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  NOT HERE: a bad row. Row failures are counted and reported in         │
//! │  ImportOutcome::errors, and the import keeps going.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

/// Result type alias for interchange operations.
pub type InterchangeResult<T> = Result<T, InterchangeError>;

/// Whole-operation failures.
#[derive(Debug, Error)]
pub enum InterchangeError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// The company an operation was bound to doesn't exist.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// No job with this ID (never started, or its result was already taken).
    #[error("Import job not found: {0}")]
    JobNotFound(String),

    /// The job is still running; its result isn't available yet.
    #[error("Import job {0} has not finished")]
    JobNotFinished(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// CSV encode failure or invalid input argument.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Filesystem error (writing an export).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background task running an import panicked or was cancelled.
    #[error("Import task failed: {0}")]
    TaskFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for InterchangeError {
    fn from(err: ValidationError) -> Self {
        InterchangeError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for InterchangeError {
    fn from(err: toml::de::Error) -> Self {
        InterchangeError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for InterchangeError {
    fn from(err: toml::ser::Error) -> Self {
        InterchangeError::ConfigSaveFailed(err.to_string())
    }
}

impl InterchangeError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            InterchangeError::InvalidConfig(_)
                | InterchangeError::ConfigLoadFailed(_)
                | InterchangeError::ConfigSaveFailed(_)
        )
    }
}
