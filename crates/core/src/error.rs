//! Core error types

use thiserror::Error;

/// Core error type for AgroSense
#[derive(Debug, Error)]
pub enum CoreError {
    /// A scoring input was NaN or infinite
    #[error("Invalid input: {field} must be finite, got {value}")]
    InvalidInput {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// A sampling distribution could not be built
    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
