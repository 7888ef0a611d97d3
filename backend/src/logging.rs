//! `tracing` subscriber setup for the CLI host.
//!
//! Library code only emits events; installing a subscriber is left to the
//! binary. Output goes to stderr so stdout stays clean JSON.

use tracing_subscriber::{fmt, EnvFilter};

const FALLBACK_FILTER: &str = "info";

/// Build an [`EnvFilter`] from a directive string, falling back to `info`.
pub fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init(directive: &str) -> bool {
    fmt()
        .with_env_filter(build_filter(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        let filter = build_filter("survey=debug,warn");
        assert!(filter.to_string().contains("survey=debug"));
    }

    #[test]
    fn test_build_filter_falls_back_on_garbage() {
        let filter = build_filter("survey=notalevel");
        assert_eq!(filter.to_string(), FALLBACK_FILTER);
    }
}
