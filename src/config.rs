//! Environment-driven configuration for the API endpoint, the request
//! timeout, and the session file location. Values are trimmed and empty
//! values fall back to the defaults so a blank variable behaves like an
//! unset one. Configuration values are public; do not store secrets here.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL used when `EMPDESK_API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
/// Default request timeout (milliseconds) applied to every HTTP call.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default session file, relative to the working directory.
const DEFAULT_SESSION_FILE: &str = "empdesk-session.json";

/// Client configuration derived from environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub session_file: PathBuf,
}

impl AppConfig {
    /// Loads config from the environment, applying defaults for unset or
    /// blank variables.
    #[must_use]
    pub fn load() -> Self {
        let api_base_url =
            read_env("EMPDESK_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let request_timeout = read_env("EMPDESK_HTTP_TIMEOUT_MS")
            .and_then(|raw| raw.parse().ok())
            .map_or(Duration::from_millis(DEFAULT_TIMEOUT_MS), Duration::from_millis);
        let session_file = read_env("EMPDESK_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        Self {
            api_base_url,
            request_timeout,
            session_file,
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| normalize_value(&value))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DEFAULT_API_BASE_URL, normalize_value};
    use std::time::Duration;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  http://api.empdesk.test "),
            Some("http://api.empdesk.test".to_string())
        );
    }

    #[test]
    fn load_uses_defaults_when_unset() {
        temp_env::with_vars(
            [
                ("EMPDESK_API_BASE_URL", None::<&str>),
                ("EMPDESK_HTTP_TIMEOUT_MS", None),
                ("EMPDESK_SESSION_FILE", None),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert_eq!(config.request_timeout, Duration::from_millis(10_000));
                assert_eq!(config.session_file.to_str(), Some("empdesk-session.json"));
            },
        );
    }

    #[test]
    fn load_reads_overrides() {
        temp_env::with_vars(
            [
                ("EMPDESK_API_BASE_URL", Some("http://api.override:9000/v2 ")),
                ("EMPDESK_HTTP_TIMEOUT_MS", Some("2500")),
                ("EMPDESK_SESSION_FILE", Some("/tmp/session.json")),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, "http://api.override:9000/v2");
                assert_eq!(config.request_timeout, Duration::from_millis(2500));
                assert_eq!(config.session_file.to_str(), Some("/tmp/session.json"));
            },
        );
    }

    #[test]
    fn load_ignores_blank_or_invalid_overrides() {
        temp_env::with_vars(
            [
                ("EMPDESK_API_BASE_URL", Some("   ")),
                ("EMPDESK_HTTP_TIMEOUT_MS", Some("not-a-number")),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert_eq!(config.request_timeout, Duration::from_millis(10_000));
            },
        );
    }
}
