//! Batch intake: validate-then-derive over a list of raw JSON submissions.
//!
//! Each element is handled independently; an invalid element is counted and
//! reported by index, never aborting the rest of the batch.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::derive::RecordDeriver;
use crate::error::{IntakeError, IntakeResult, ValidationError, ROOT_FIELD};
use crate::models::{StoredSurveyRecord, SurveySubmission};
use crate::validation::validate_all;

/// Validation failures for one input element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordErrors {
    /// Position of the element in the input.
    pub index: usize,
    pub errors: Vec<ValidationError>,
}

/// Valid/invalid counts plus per-element errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid_count: usize,
    pub invalid_count: usize,
    pub errors: Vec<RecordErrors>,
}

impl ValidationReport {
    pub fn all_valid(&self) -> bool {
        self.invalid_count == 0
    }
}

/// Derived records plus the validation report for the whole batch.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReport {
    pub records: Vec<StoredSurveyRecord>,
    pub validation: ValidationReport,
}

/// Parse file contents: an array of objects, or a single object.
pub fn parse_input(content: &str) -> IntakeResult<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        Value::Null => Err(IntakeError::UnexpectedShape("null".into())),
        Value::Bool(_) => Err(IntakeError::UnexpectedShape("a boolean".into())),
        Value::Number(_) => Err(IntakeError::UnexpectedShape("a number".into())),
        Value::String(_) => Err(IntakeError::UnexpectedShape("a string".into())),
    }
}

/// Read and parse a JSON input file.
pub fn load_records(path: &Path) -> IntakeResult<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let records = parse_input(&content)?;
    tracing::info!(path = %path.display(), count = records.len(), "loaded raw submissions");
    Ok(records)
}

fn validate_one(raw: &Value) -> Result<SurveySubmission, Vec<ValidationError>> {
    match raw {
        Value::Object(map) => validate_all(map),
        _ => Err(vec![ValidationError::new(ROOT_FIELD, "expected an object")]),
    }
}

/// Validate every element, collecting counts and errors.
pub fn validate_records(records: &[Value]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (index, raw) in records.iter().enumerate() {
        match validate_one(raw) {
            Ok(_) => report.valid_count += 1,
            Err(errors) => {
                report.invalid_count += 1;
                report.errors.push(RecordErrors { index, errors });
            }
        }
    }
    report
}

/// Validate and derive every element; invalid elements are skipped.
pub fn derive_records(
    records: &[Value],
    client_ip: &str,
    deriver: &RecordDeriver,
) -> IntakeReport {
    let mut derived = Vec::with_capacity(records.len());
    let mut validation = ValidationReport::default();

    for (index, raw) in records.iter().enumerate() {
        match validate_one(raw) {
            Ok(submission) => {
                validation.valid_count += 1;
                derived.push(deriver.derive(&submission, client_ip));
            }
            Err(errors) => {
                validation.invalid_count += 1;
                validation.errors.push(RecordErrors { index, errors });
            }
        }
    }

    if validation.invalid_count > 0 {
        tracing::warn!(
            valid = validation.valid_count,
            invalid = validation.invalid_count,
            "some submissions failed validation"
        );
    } else {
        tracing::info!(count = validation.valid_count, "all submissions derived");
    }

    IntakeReport {
        records: derived,
        validation,
    }
}

/// Load a JSON file and derive a record for every valid element.
pub fn process_file(
    path: &Path,
    client_ip: &str,
    deriver: &RecordDeriver,
) -> IntakeResult<IntakeReport> {
    let records = load_records(path)?;
    Ok(derive_records(&records, client_ip, deriver))
}
