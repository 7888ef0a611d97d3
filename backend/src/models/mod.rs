//! Domain models for survey intake.
//!
//! - [`SurveySubmission`] - validated input, plaintext identity fields
//! - [`SurveyAnswers`] - fields copied verbatim into the stored record
//! - [`StoredSurveyRecord`] - storage-ready record with hashed identity
//! - [`HexDigest`] - 64-char lowercase SHA-256 hex string
//!
//! A stored record is composed from the submission's answers rather than
//! sharing one struct with overlapping fields. Plaintext email and age never
//! reach a [`StoredSurveyRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ValidationError, ValidationResult};
use crate::validation::{COMMENTS_MAX_CHARS, NAME_MAX_CHARS, RATING_MAX, RATING_MIN};

// =============================================================================
// Hex Digest
// =============================================================================

/// Lowercase hex SHA-256 digest.
///
/// Deserializing checks the shape, so a plaintext value cannot pass as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct HexDigest(String);

impl HexDigest {
    /// Length of a SHA-256 digest rendered as hex.
    pub const LEN: usize = 64;

    pub(crate) fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    /// Accept `value` only if it is 64 lowercase hex chars.
    pub fn parse(value: &str) -> ValidationResult<Self> {
        let well_formed = value.len() == Self::LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(ValidationError::new(
                "digest",
                "must be 64 lowercase hex characters",
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexDigest {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexDigest> for String {
    fn from(digest: HexDigest) -> Self {
        digest.0
    }
}

impl AsRef<str> for HexDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Survey Answers
// =============================================================================

/// Non-identifying fields shared by submissions and stored records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyAnswers {
    name: String,
    consent: bool,
    rating: u8,
    comments: Option<String>,
    user_agent: Option<String>,
}

impl SurveyAnswers {
    pub(crate) fn new(
        name: String,
        rating: u8,
        comments: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            name,
            consent: true,
            rating,
            comments,
            user_agent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always `true` for anything that passed validation.
    pub fn consent(&self) -> bool {
        self.consent
    }

    /// Rating in 1..=5.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Trimmed comments, if any were given.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

// =============================================================================
// Survey Submission (validated input)
// =============================================================================

/// A validated survey submission.
///
/// The only way to build one is through [`crate::validation::validate`] (or
/// deserializing, which runs the same rules). Fields are private, so every
/// constraint holds for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SurveySubmission {
    #[serde(flatten)]
    answers: SurveyAnswers,
    email: String,
    age: u8,
    submission_id: Option<String>,
}

impl SurveySubmission {
    pub(crate) fn new(
        answers: SurveyAnswers,
        email: String,
        age: u8,
        submission_id: Option<String>,
    ) -> Self {
        Self {
            answers,
            email,
            age,
            submission_id,
        }
    }

    pub fn answers(&self) -> &SurveyAnswers {
        &self.answers
    }

    pub fn name(&self) -> &str {
        self.answers.name()
    }

    /// Plaintext email, exactly as submitted.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Age in 13..=120.
    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn consent(&self) -> bool {
        self.answers.consent()
    }

    pub fn rating(&self) -> u8 {
        self.answers.rating()
    }

    pub fn comments(&self) -> Option<&str> {
        self.answers.comments()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.answers.user_agent()
    }

    /// Caller-supplied submission id, if any (may be empty).
    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }
}

impl TryFrom<Map<String, Value>> for SurveySubmission {
    type Error = ValidationError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        crate::validation::validate(&raw)
    }
}

impl TryFrom<&Value> for SurveySubmission {
    type Error = ValidationError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        crate::validation::validate_value(raw)
    }
}

// =============================================================================
// Stored Survey Record (derived)
// =============================================================================

/// Storage-ready record derived from one submission plus one client address.
///
/// Serialized field names match the submission's (`email` and `age` now hold
/// digests), plus `received_at` and `ip`. Reading one back from storage
/// re-checks the record's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecordFields")]
pub struct StoredSurveyRecord {
    #[serde(flatten)]
    answers: SurveyAnswers,
    email: HexDigest,
    age: HexDigest,
    submission_id: String,
    received_at: DateTime<Utc>,
    ip: String,
}

impl StoredSurveyRecord {
    pub(crate) fn new(
        answers: SurveyAnswers,
        email: HexDigest,
        age: HexDigest,
        submission_id: String,
        received_at: DateTime<Utc>,
        ip: String,
    ) -> Self {
        Self {
            answers,
            email,
            age,
            submission_id,
            received_at,
            ip,
        }
    }

    pub fn answers(&self) -> &SurveyAnswers {
        &self.answers
    }

    pub fn name(&self) -> &str {
        self.answers.name()
    }

    /// SHA-256 of the original email.
    pub fn email(&self) -> &HexDigest {
        &self.email
    }

    /// SHA-256 of the original age's decimal string.
    pub fn age(&self) -> &HexDigest {
        &self.age
    }

    pub fn consent(&self) -> bool {
        self.answers.consent()
    }

    pub fn rating(&self) -> u8 {
        self.answers.rating()
    }

    pub fn comments(&self) -> Option<&str> {
        self.answers.comments()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.answers.user_agent()
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }
}

/// Unchecked shape of a stored record as read from storage.
#[derive(Deserialize)]
struct StoredRecordFields {
    name: String,
    email: HexDigest,
    age: HexDigest,
    consent: bool,
    rating: u8,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    submission_id: String,
    received_at: DateTime<Utc>,
    ip: String,
}

impl TryFrom<StoredRecordFields> for StoredSurveyRecord {
    type Error = ValidationError;

    fn try_from(raw: StoredRecordFields) -> Result<Self, Self::Error> {
        let name_len = raw.name.chars().count();
        if name_len == 0 || name_len > NAME_MAX_CHARS {
            return Err(ValidationError::new(
                "name",
                format!("must be 1 to {NAME_MAX_CHARS} characters"),
            ));
        }
        if !raw.consent {
            return Err(ValidationError::new("consent", "consent must be true"));
        }
        if !(RATING_MIN..=RATING_MAX).contains(&i64::from(raw.rating)) {
            return Err(ValidationError::new(
                "rating",
                format!("must be between {RATING_MIN} and {RATING_MAX}"),
            ));
        }
        if let Some(ref comments) = raw.comments {
            if comments.chars().count() > COMMENTS_MAX_CHARS {
                return Err(ValidationError::new(
                    "comments",
                    format!("must be at most {COMMENTS_MAX_CHARS} characters"),
                ));
            }
        }
        if raw.submission_id.is_empty() {
            return Err(ValidationError::new("submission_id", "must not be empty"));
        }

        Ok(Self::new(
            SurveyAnswers::new(raw.name, raw.rating, raw.comments, raw.user_agent),
            raw.email,
            raw.age,
            raw.submission_id,
            raw.received_at,
            raw.ip,
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn answers() -> SurveyAnswers {
        SurveyAnswers::new("Jo".into(), 4, Some("great".into()), None)
    }

    #[test]
    fn test_submission_deserialize_runs_validation() {
        let ok: SurveySubmission = serde_json::from_value(json!({
            "name": "Jo",
            "email": "jo@example.com",
            "age": 30,
            "consent": true,
            "rating": 4
        }))
        .unwrap();
        assert_eq!(ok.email(), "jo@example.com");
        assert_eq!(ok.age(), 30);

        let err = serde_json::from_value::<SurveySubmission>(json!({
            "name": "Jo",
            "email": "jo@example.com",
            "age": 30,
            "consent": false,
            "rating": 4
        }))
        .unwrap_err();
        assert!(err.to_string().contains("consent"));
    }

    #[test]
    fn test_submission_serializes_flat_field_names() {
        let sub = SurveySubmission::new(answers(), "jo@example.com".into(), 30, None);
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["name"], "Jo");
        assert_eq!(json["email"], "jo@example.com");
        assert_eq!(json["age"], 30);
        assert_eq!(json["consent"], true);
        assert_eq!(json["comments"], "great");
        assert!(json["submission_id"].is_null());
        assert!(json.get("answers").is_none());
    }

    #[test]
    fn test_stored_record_serialization() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let record = StoredSurveyRecord::new(
            answers(),
            HexDigest::from_hex("a".repeat(64)),
            HexDigest::from_hex("b".repeat(64)),
            "sub-1".into(),
            at,
            "1.2.3.4".into(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["email"], "a".repeat(64));
        assert_eq!(json["age"], "b".repeat(64));
        assert_eq!(json["submission_id"], "sub-1");
        assert_eq!(json["ip"], "1.2.3.4");
        assert_eq!(json["received_at"], "2024-05-01T09:30:00Z");
        assert_eq!(json["rating"], 4);

        let back: StoredSurveyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    fn stored_json() -> Value {
        json!({
            "name": "Jo",
            "email": "a".repeat(64),
            "age": "b".repeat(64),
            "consent": true,
            "rating": 4,
            "comments": "great",
            "user_agent": null,
            "submission_id": "sub-1",
            "received_at": "2024-05-01T09:30:00Z",
            "ip": "1.2.3.4"
        })
    }

    fn stored_with(field: &str, value: Value) -> Result<StoredSurveyRecord, serde_json::Error> {
        let mut raw = stored_json();
        raw[field] = value;
        serde_json::from_value(raw)
    }

    #[test]
    fn test_hex_digest_rejects_non_digests() {
        assert!(serde_json::from_value::<HexDigest>(json!("not-a-digest")).is_err());
        assert!(serde_json::from_value::<HexDigest>(json!("A".repeat(64))).is_err());
        assert!(serde_json::from_value::<HexDigest>(json!("a".repeat(63))).is_err());
        assert!(serde_json::from_value::<HexDigest>(json!(42)).is_err());

        let ok: HexDigest = serde_json::from_value(json!("0f".repeat(32))).unwrap();
        assert_eq!(ok.as_str(), "0f".repeat(32));
    }

    #[test]
    fn test_stored_record_accepts_well_formed_input() {
        let record: StoredSurveyRecord = serde_json::from_value(stored_json()).unwrap();
        assert_eq!(record.submission_id(), "sub-1");
        assert_eq!(record.comments(), Some("great"));
        assert_eq!(record.user_agent(), None);
    }

    #[test]
    fn test_stored_record_rejects_broken_invariants() {
        let cases = [
            ("email", json!("jo@example.com"), "digest"),
            ("age", json!("30"), "digest"),
            ("consent", json!(false), "consent"),
            ("rating", json!(200), "rating"),
            ("rating", json!(0), "rating"),
            ("submission_id", json!(""), "submission_id"),
            ("name", json!(""), "name"),
            ("comments", json!("x".repeat(1001)), "comments"),
        ];
        for (field, value, expected) in cases {
            let err = stored_with(field, value.clone()).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{field}={value} should be rejected, got: {err}"
            );
        }
    }

    #[test]
    fn test_hex_digest_display() {
        let digest = HexDigest::from_hex("ab".repeat(32));
        assert_eq!(digest.to_string().len(), HexDigest::LEN);
        assert_eq!(digest.as_str(), digest.as_ref());
    }
}
