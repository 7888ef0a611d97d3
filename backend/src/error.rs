//! Error types for survey intake.
//!
//! - [`ValidationError`] - a raw field failed its constraint
//! - [`ConfigError`] - a configuration value could not be parsed
//! - [`IntakeError`] - top-level errors for batch/file processing
//!
//! Derivation itself never fails, so there is no error type for it.
//! Conversions are provided via `From` so `?` works across boundaries.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Validation Errors
// =============================================================================

/// Field name used when the raw input is not an object at all.
pub const ROOT_FIELD: &str = "$root";

/// A single field constraint violation.
///
/// Raised only while constructing a [`crate::SurveySubmission`]; a failed
/// validation yields no submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid field '{field}': {reason}")]
pub struct ValidationError {
    /// Name of the failing field.
    pub field: String,
    /// Human-readable constraint that was violated.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a required field that was absent or null.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "field required")
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown dedup window name.
    #[error("unknown dedup window '{0}' (expected minute, hour or day)")]
    UnknownWindow(String),

    /// Environment variable held a value that could not be used.
    #[error("invalid value for {var}: {message}")]
    InvalidEnv { var: String, message: String },
}

// =============================================================================
// Intake Errors (top-level)
// =============================================================================

/// Errors while reading and processing a batch of raw submissions.
///
/// Individual invalid records are not errors here; they are counted in
/// [`crate::transform::intake::IntakeReport`].
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Failed to read or write a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input JSON had the wrong shape.
    #[error("expected a JSON object or an array of objects, found {0}")]
    UnexpectedShape(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for batch intake.
pub type IntakeResult<T> = Result<T, IntakeError>;
