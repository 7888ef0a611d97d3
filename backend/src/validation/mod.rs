//! Survey submission validation.
//!
//! Turns an untrusted field mapping into a [`SurveySubmission`]. Each field
//! has one explicit rule function of its raw value; [`validate`] stops at the
//! first violation while [`validate_all`] reports every violating field.
//!
//! | Field           | Rule                                         |
//! |-----------------|----------------------------------------------|
//! | `name`          | required string, 1..=100 chars               |
//! | `email`         | required string, valid address, domain lowercased |
//! | `age`           | required integer, 13..=120                   |
//! | `consent`       | required, literally `true`                   |
//! | `rating`        | required integer, 1..=5                      |
//! | `comments`      | optional string, trimmed, <= 1000 chars      |
//! | `user_agent`    | optional string, passed through              |
//! | `submission_id` | optional string, passed through              |
//!
//! Unknown keys are ignored. A `null` value is treated like an absent key.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use survey::validate_value;
//!
//! let raw = json!({
//!     "name": "Jo",
//!     "email": "jo@example.com",
//!     "age": 30,
//!     "consent": true,
//!     "rating": 4,
//!     "comments": " great "
//! });
//! let submission = validate_value(&raw).unwrap();
//! assert_eq!(submission.comments(), Some("great"));
//! ```

pub mod email;

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult, ROOT_FIELD};
use crate::models::{SurveyAnswers, SurveySubmission};

pub use email::{is_valid_email, normalize_email};

/// Raw field names accepted by the validator.
pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const AGE: &str = "age";
    pub const CONSENT: &str = "consent";
    pub const RATING: &str = "rating";
    pub const COMMENTS: &str = "comments";
    pub const USER_AGENT: &str = "user_agent";
    pub const SUBMISSION_ID: &str = "submission_id";
}

pub const NAME_MAX_CHARS: usize = 100;
pub const COMMENTS_MAX_CHARS: usize = 1000;
pub const AGE_MIN: i64 = 13;
pub const AGE_MAX: i64 = 120;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

// =============================================================================
// Entry points
// =============================================================================

/// Validate a raw field mapping, failing on the first violation.
pub fn validate(raw: &Map<String, Value>) -> ValidationResult<SurveySubmission> {
    let result = validate_fields(raw);
    if let Err(ref err) = result {
        tracing::debug!(field = %err.field, reason = %err.reason, "survey submission rejected");
    }
    result
}

fn validate_fields(raw: &Map<String, Value>) -> ValidationResult<SurveySubmission> {
    let name = check_name(raw.get(fields::NAME))?;
    let email = check_email(raw.get(fields::EMAIL))?;
    let age = check_age(raw.get(fields::AGE))?;
    check_consent(raw.get(fields::CONSENT))?;
    let rating = check_rating(raw.get(fields::RATING))?;
    let comments = check_comments(raw.get(fields::COMMENTS))?;
    let user_agent = optional_string(fields::USER_AGENT, raw.get(fields::USER_AGENT))?;
    let submission_id = optional_string(fields::SUBMISSION_ID, raw.get(fields::SUBMISSION_ID))?;

    Ok(SurveySubmission::new(
        SurveyAnswers::new(name, rating, comments, user_agent),
        email,
        age,
        submission_id,
    ))
}

/// Validate a raw field mapping, collecting every violating field.
pub fn validate_all(raw: &Map<String, Value>) -> Result<SurveySubmission, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = keep(&mut errors, check_name(raw.get(fields::NAME)));
    let email = keep(&mut errors, check_email(raw.get(fields::EMAIL)));
    let age = keep(&mut errors, check_age(raw.get(fields::AGE)));
    let consent = keep(&mut errors, check_consent(raw.get(fields::CONSENT)));
    let rating = keep(&mut errors, check_rating(raw.get(fields::RATING)));
    let comments = keep(&mut errors, check_comments(raw.get(fields::COMMENTS)));
    let user_agent = keep(
        &mut errors,
        optional_string(fields::USER_AGENT, raw.get(fields::USER_AGENT)),
    );
    let submission_id = keep(
        &mut errors,
        optional_string(fields::SUBMISSION_ID, raw.get(fields::SUBMISSION_ID)),
    );

    match (name, email, age, consent, rating, comments, user_agent, submission_id) {
        (
            Some(name),
            Some(email),
            Some(age),
            Some(()),
            Some(rating),
            Some(comments),
            Some(user_agent),
            Some(submission_id),
        ) => Ok(SurveySubmission::new(
            SurveyAnswers::new(name, rating, comments, user_agent),
            email,
            age,
            submission_id,
        )),
        _ => {
            tracing::debug!(violations = errors.len(), "survey submission rejected");
            Err(errors)
        }
    }
}

/// Validate any JSON value; non-objects fail on the `$root` field.
pub fn validate_value(raw: &Value) -> ValidationResult<SurveySubmission> {
    match raw {
        Value::Object(map) => validate(map),
        other => Err(ValidationError::new(
            ROOT_FIELD,
            format!("expected an object, found {}", json_type(other)),
        )),
    }
}

/// Quick check: does this value validate?
pub fn is_valid(raw: &Value) -> bool {
    validate_value(raw).is_ok()
}

fn keep<T>(errors: &mut Vec<ValidationError>, result: ValidationResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push(err);
            None
        }
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn check_name(raw: Option<&Value>) -> ValidationResult<String> {
    let name = required_string(fields::NAME, raw)?;
    let len = name.chars().count();
    if len == 0 {
        return Err(ValidationError::new(fields::NAME, "must not be empty"));
    }
    if len > NAME_MAX_CHARS {
        return Err(ValidationError::new(
            fields::NAME,
            format!("must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

fn check_email(raw: Option<&Value>) -> ValidationResult<String> {
    let email = required_string(fields::EMAIL, raw)?;
    if !is_valid_email(email) {
        return Err(ValidationError::new(
            fields::EMAIL,
            "is not a valid email address",
        ));
    }
    Ok(normalize_email(email))
}

fn check_age(raw: Option<&Value>) -> ValidationResult<u8> {
    bounded_int(fields::AGE, raw, AGE_MIN, AGE_MAX)
}

fn check_consent(raw: Option<&Value>) -> ValidationResult<()> {
    match raw {
        Some(Value::Bool(true)) => Ok(()),
        _ => Err(ValidationError::new(fields::CONSENT, "consent must be true")),
    }
}

fn check_rating(raw: Option<&Value>) -> ValidationResult<u8> {
    bounded_int(fields::RATING, raw, RATING_MIN, RATING_MAX)
}

fn check_comments(raw: Option<&Value>) -> ValidationResult<Option<String>> {
    let Some(comments) = optional_str(fields::COMMENTS, raw)? else {
        return Ok(None);
    };
    let trimmed = comments.trim();
    if trimmed.chars().count() > COMMENTS_MAX_CHARS {
        return Err(ValidationError::new(
            fields::COMMENTS,
            format!("must be at most {COMMENTS_MAX_CHARS} characters"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

// =============================================================================
// Shape helpers
// =============================================================================

fn required_string<'a>(field: &str, raw: Option<&'a Value>) -> ValidationResult<&'a str> {
    optional_str(field, raw)?.ok_or_else(|| ValidationError::missing(field))
}

fn optional_str<'a>(field: &str, raw: Option<&'a Value>) -> ValidationResult<Option<&'a str>> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ValidationError::new(
            field,
            format!("must be a string, found {}", json_type(other)),
        )),
    }
}

fn optional_string(field: &str, raw: Option<&Value>) -> ValidationResult<Option<String>> {
    Ok(optional_str(field, raw)?.map(str::to_string))
}

fn bounded_int(field: &str, raw: Option<&Value>, min: i64, max: i64) -> ValidationResult<u8> {
    let out_of_range = || ValidationError::new(field, format!("must be between {min} and {max}"));

    let number = match raw {
        None | Some(Value::Null) => return Err(ValidationError::missing(field)),
        Some(Value::Number(n)) => n,
        Some(other) => {
            return Err(ValidationError::new(
                field,
                format!("must be an integer, found {}", json_type(other)),
            ))
        }
    };

    if let Some(value) = number.as_i64() {
        if !(min..=max).contains(&value) {
            return Err(out_of_range());
        }
        return u8::try_from(value).map_err(|_| out_of_range());
    }
    if number.is_u64() {
        return Err(out_of_range());
    }
    Err(ValidationError::new(field, "must be an integer"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Tests
// =============================================================================
