//! # Survey - submission validation and pseudonymised record derivation
//!
//! Validates untrusted survey fields and derives a storage record in which
//! the identifying fields (email, age) are replaced by SHA-256 digests and a
//! deduplication-friendly submission id is assigned.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  raw fields │────▶│  Validator  │────▶│ SurveySubmission │────▶│   Deriver    │──▶ StoredSurveyRecord
//! │ (JSON map)  │     │  (rules)    │     │   (plaintext)    │     │ (+ client IP)│
//! └─────────────┘     └─────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! Persistence and transport are out of scope: callers take the finished
//! [`StoredSurveyRecord`] and store it however they like.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use serde_json::json;
//! use survey::{derive, validate_value};
//!
//! let raw = json!({
//!     "name": "Jo",
//!     "email": "jo@example.com",
//!     "age": 30,
//!     "consent": true,
//!     "rating": 4
//! });
//! let submission = validate_value(&raw)?;
//! let record = derive(&submission, "1.2.3.4");
//! assert_eq!(record.email().as_str().len(), 64);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Submission and stored record
//! - [`validation`] - Field rules
//! - [`transform`] - Hashing, derivation and batch intake
//! - [`config`] - Dedup window and environment configuration
//! - [`logging`] - `tracing` subscriber for the CLI

// Core modules
pub mod error;
pub mod models;

// Validation
pub mod validation;

// Derivation
pub mod transform;

// Host support
pub mod config;
pub mod logging;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, IntakeError, ValidationError};

pub use models::{HexDigest, StoredSurveyRecord, SurveyAnswers, SurveySubmission};

pub use validation::{is_valid, is_valid_email, validate, validate_all, validate_value};

pub use transform::{
    derive, derive_records, process_file, sha256_hex, validate_records, IntakeReport,
    RecordDeriver, ValidationReport,
};

pub use config::{AppConfig, DedupWindow, DeriveConfig};
