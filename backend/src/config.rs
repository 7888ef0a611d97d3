//! Runtime configuration.
//!
//! The library only needs [`DeriveConfig`]. [`AppConfig`] adds what the CLI
//! host reads from the environment (`.env` is loaded by `main` first):
//!
//! | Variable              | Default | Meaning                               |
//! |-----------------------|---------|---------------------------------------|
//! | `SURVEY_DEDUP_WINDOW` | `hour`  | Bucket width for derived ids          |
//! | `SURVEY_LOG`          | `info`  | `tracing` filter directive            |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

pub const ENV_DEDUP_WINDOW: &str = "SURVEY_DEDUP_WINDOW";
pub const ENV_LOG: &str = "SURVEY_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

// =============================================================================
// Dedup window
// =============================================================================

/// Width of the time bucket mixed into derived submission ids.
///
/// Two submissions from the same email inside one bucket get the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupWindow {
    Minute,
    #[default]
    Hour,
    Day,
}

impl DedupWindow {
    /// `chrono` format string for the bucket key.
    pub fn format(self) -> &'static str {
        match self {
            Self::Minute => "%Y%m%d%H%M",
            Self::Hour => "%Y%m%d%H",
            Self::Day => "%Y%m%d",
        }
    }

    /// Bucket key for `now`, e.g. `2024050109` for the hour window.
    pub fn bucket_key(self, now: DateTime<Utc>) -> String {
        now.format(self.format()).to_string()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl fmt::Display for DedupWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupWindow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            _ => Err(ConfigError::UnknownWindow(s.to_string())),
        }
    }
}

// =============================================================================
// Derive config
// =============================================================================

/// Settings for [`crate::transform::RecordDeriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeriveConfig {
    #[serde(default)]
    pub dedup_window: DedupWindow,
}

impl DeriveConfig {
    pub fn with_window(dedup_window: DedupWindow) -> Self {
        Self { dedup_window }
    }
}

// =============================================================================
// App config (CLI host)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub derive: DeriveConfig,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            derive: DeriveConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(window) = lookup(ENV_DEDUP_WINDOW).filter(|v| !v.trim().is_empty()) {
            cfg.derive.dedup_window = window.parse::<DedupWindow>().map_err(|e: ConfigError| {
                ConfigError::InvalidEnv {
                    var: ENV_DEDUP_WINDOW.to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            cfg.log_filter = filter;
        }

        Ok(cfg)
    }
}
