//! Derive a storage record from a validated submission.
//!
//! ```text
//! SurveySubmission ──┬─ email ──────────────▶ sha256 ─▶ email
//!                    ├─ age (decimal) ──────▶ sha256 ─▶ age
//!                    ├─ submission_id? ─────▶ reused verbatim if non-empty
//!                    │   else email ++ bucket(now) ─▶ sha256 ─▶ submission_id
//!                    └─ answers ────────────▶ copied
//! client ip ───────────────────────────────────────▶ ip
//! now ─────────────────────────────────────────────▶ received_at
//! ```
//!
//! `now` is read once per derivation and feeds both the id bucket and
//! `received_at`, so the two can never straddle a bucket boundary.

use chrono::{DateTime, Utc};

use super::hashing::sha256_hex;
use crate::config::DeriveConfig;
use crate::models::{StoredSurveyRecord, SurveySubmission};

/// Derive with the default configuration and the current UTC time.
pub fn derive(submission: &SurveySubmission, client_ip: &str) -> StoredSurveyRecord {
    RecordDeriver::default().derive(submission, client_ip)
}

/// Stateless deriver; holds only configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordDeriver {
    config: DeriveConfig,
}

impl RecordDeriver {
    pub fn new(config: DeriveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeriveConfig {
        &self.config
    }

    /// Derive using the current UTC time.
    pub fn derive(&self, submission: &SurveySubmission, client_ip: &str) -> StoredSurveyRecord {
        self.derive_at(submission, client_ip, Utc::now())
    }

    /// Derive as if the clock read `now`.
    pub fn derive_at(
        &self,
        submission: &SurveySubmission,
        client_ip: &str,
        now: DateTime<Utc>,
    ) -> StoredSurveyRecord {
        let email = sha256_hex(submission.email());
        let age = sha256_hex(&submission.age().to_string());

        let (submission_id, id_source) = match submission.submission_id() {
            Some(id) if !id.is_empty() => (id.to_string(), "caller"),
            _ => (self.derived_id(submission.email(), now), "derived"),
        };

        tracing::debug!(
            submission_id = %submission_id,
            id_source,
            window = %self.config.dedup_window,
            "derived survey record"
        );

        StoredSurveyRecord::new(
            submission.answers().clone(),
            email,
            age,
            submission_id,
            now,
            client_ip.to_string(),
        )
    }

    /// Id shared by every submission from `email` inside the bucket of `now`.
    pub fn derived_id(&self, email: &str, now: DateTime<Utc>) -> String {
        let bucket = self.config.dedup_window.bucket_key(now);
        sha256_hex(&format!("{email}{bucket}")).into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DedupWindow;
    use crate::validation::validate_value;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn submission(extra: Value) -> SurveySubmission {
        let mut raw = json!({
            "name": "Jo",
            "email": "jo@example.com",
            "age": 30,
            "consent": true,
            "rating": 4,
            "comments": " great "
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut raw, extra) {
            base.extend(extra);
        }
        validate_value(&raw).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
    }

    fn is_hex64(s: &str) -> bool {
        s.len() == 64 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn test_example_record() {
        let sub = submission(json!({}));
        let now = at(9, 15);
        let record = RecordDeriver::default().derive_at(&sub, "1.2.3.4", now);

        assert_eq!(record.name(), "Jo");
        assert!(record.consent());
        assert_eq!(record.rating(), 4);
        assert_eq!(record.comments(), Some("great"));
        assert_eq!(record.ip(), "1.2.3.4");
        assert_eq!(record.received_at(), now);
        assert!(is_hex64(record.email().as_str()));
        assert!(is_hex64(record.age().as_str()));
        assert!(is_hex64(record.submission_id()));
    }

    #[test]
    fn test_identity_fields_are_hashed() {
        let sub = submission(json!({}));
        let record = derive(&sub, "1.2.3.4");

        assert_eq!(record.email(), &sha256_hex("jo@example.com"));
        assert_eq!(record.age(), &sha256_hex("30"));
        assert_ne!(record.email().as_str(), "jo@example.com");
        assert_ne!(record.age().as_str(), "30");
    }

    #[test]
    fn test_derivation_is_deterministic_within_an_hour() {
        let sub = submission(json!({}));
        let deriver = RecordDeriver::default();
        let first = deriver.derive_at(&sub, "1.2.3.4", at(9, 0));
        let second = deriver.derive_at(&sub, "1.2.3.4", at(9, 59));

        assert_eq!(first.email(), second.email());
        assert_eq!(first.age(), second.age());
        assert_eq!(first.submission_id(), second.submission_id());
    }

    #[test]
    fn test_derived_id_matches_email_plus_hour_bucket() {
        let sub = submission(json!({}));
        let record = RecordDeriver::default().derive_at(&sub, "1.2.3.4", at(9, 15));
        assert_eq!(
            record.submission_id(),
            sha256_hex("jo@example.com2024050109").as_str()
        );
    }

    #[test]
    fn test_derived_id_changes_across_hours_and_emails() {
        let deriver = RecordDeriver::default();
        let jo = submission(json!({}));
        let sam = submission(json!({ "email": "sam@example.com" }));

        let jo_nine = deriver.derive_at(&jo, "1.2.3.4", at(9, 59));
        let jo_ten = deriver.derive_at(&jo, "1.2.3.4", at(10, 0));
        let sam_nine = deriver.derive_at(&sam, "1.2.3.4", at(9, 59));

        assert_ne!(jo_nine.submission_id(), jo_ten.submission_id());
        assert_ne!(jo_nine.submission_id(), sam_nine.submission_id());
    }

    #[test]
    fn test_domain_case_does_not_split_dedup() {
        let deriver = RecordDeriver::default();
        let upper = submission(json!({ "email": "jo@Example.COM" }));
        let lower = submission(json!({ "email": "jo@example.com" }));

        let a = deriver.derive_at(&upper, "1.2.3.4", at(9, 10));
        let b = deriver.derive_at(&lower, "1.2.3.4", at(9, 50));
        assert_eq!(a.email(), b.email());
        assert_eq!(a.submission_id(), b.submission_id());
    }

    #[test]
    fn test_caller_submission_id_passes_through() {
        let sub = submission(json!({ "submission_id": "client-key-42" }));
        let record = RecordDeriver::default().derive_at(&sub, "1.2.3.4", at(9, 0));
        assert_eq!(record.submission_id(), "client-key-42");

        let later = RecordDeriver::default().derive_at(&sub, "5.6.7.8", at(23, 0));
        assert_eq!(later.submission_id(), "client-key-42");
    }

    #[test]
    fn test_empty_caller_submission_id_is_replaced() {
        let sub = submission(json!({ "submission_id": "" }));
        let record = RecordDeriver::default().derive_at(&sub, "1.2.3.4", at(9, 0));
        assert!(is_hex64(record.submission_id()));
    }

    #[test]
    fn test_window_is_configurable() {
        let sub = submission(json!({}));
        let daily = RecordDeriver::new(DeriveConfig::with_window(DedupWindow::Day));
        assert_eq!(
            daily.derive_at(&sub, "ip", at(1, 0)).submission_id(),
            daily.derive_at(&sub, "ip", at(23, 0)).submission_id()
        );

        let per_minute = RecordDeriver::new(DeriveConfig::with_window(DedupWindow::Minute));
        assert_ne!(
            per_minute.derive_at(&sub, "ip", at(9, 1)).submission_id(),
            per_minute.derive_at(&sub, "ip", at(9, 2)).submission_id()
        );
    }

    #[test]
    fn test_ip_is_not_validated() {
        let sub = submission(json!({}));
        let record = derive(&sub, "not an address");
        assert_eq!(record.ip(), "not an address");
    }

    #[test]
    fn test_received_at_is_now() {
        let sub = submission(json!({}));
        let before = Utc::now();
        let record = derive(&sub, "1.2.3.4");
        let after = Utc::now();
        assert!(record.received_at() >= before && record.received_at() <= after);
    }

    #[test]
    fn test_record_json_shape() {
        let sub = submission(json!({ "user_agent": "curl/8.0" }));
        let record = RecordDeriver::default().derive_at(&sub, "1.2.3.4", at(9, 0));
        let json = serde_json::to_value(&record).unwrap();

        for key in [
            "name",
            "email",
            "age",
            "consent",
            "rating",
            "comments",
            "user_agent",
            "submission_id",
            "received_at",
            "ip",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["user_agent"], "curl/8.0");
        assert_eq!(json["comments"], "great");
    }
}
