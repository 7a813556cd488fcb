//! VideoIntel Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Submission Errors
    // =========================================================================
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    // =========================================================================
    // Operation Errors
    // =========================================================================
    #[error("Operation failed (code {code}): {message}")]
    OperationFailed { code: i32, message: String },

    #[error("Operation channel closed before completion: {0}")]
    OperationAbandoned(String),

    // =========================================================================
    // Local File Errors
    // =========================================================================
    #[error("Failed to read local file {path}: {source}")]
    LocalFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether the error was reported by the service for a finished operation
    pub fn is_operation_error(&self) -> bool {
        matches!(self, CoreError::OperationFailed { .. })
    }
}
