//! Room relay configuration.
//!
//! Configuration is loaded from environment variables. The application-server
//! password is redacted in Debug output.

use common::config::LoggingConfig;
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default application server that issues room tokens.
pub const DEFAULT_APP_SERVER_URL: &str = "https://sdk-snapshot.virtualcareservices.net";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Room relay configuration.
///
/// Loaded from environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the application server (scheme + host, no trailing slash).
    pub app_server_url: String,

    /// Username for Basic auth on room creation.
    pub server_username: String,

    /// Password for Basic auth on room creation.
    /// Protected by `SecretString` to prevent accidental logging.
    pub server_password: SecretString,

    /// Where persisted settings live. `None` keeps settings in memory only.
    pub settings_path: Option<PathBuf>,

    /// HTTP request timeout for application-server calls.
    pub http_timeout: Duration,

    /// Emit JSON-formatted logs.
    pub log_json: bool,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_server_url", &self.app_server_url)
            .field("server_username", &self.server_username)
            .field("server_password", &"[REDACTED]")
            .field("settings_path", &self.settings_path)
            .field("http_timeout", &self.http_timeout)
            .field("log_json", &self.log_json)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let app_server_url = vars
            .get("ROOM_RELAY_APP_SERVER_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_APP_SERVER_URL.to_string());
        let app_server_url = app_server_url.trim_end_matches('/').to_string();

        if !app_server_url.starts_with("https://") && !app_server_url.starts_with("http://") {
            return Err(ConfigError::InvalidValue(format!(
                "ROOM_RELAY_APP_SERVER_URL must start with http:// or https://, got '{app_server_url}'"
            )));
        }

        let server_username = vars
            .get("ROOM_RELAY_SERVER_USERNAME")
            .cloned()
            .unwrap_or_default();

        let server_password = SecretString::from(
            vars.get("ROOM_RELAY_SERVER_PASSWORD")
                .cloned()
                .unwrap_or_default(),
        );

        let settings_path = vars
            .get("ROOM_RELAY_SETTINGS_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let http_timeout_seconds = match vars.get("ROOM_RELAY_HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "ROOM_RELAY_HTTP_TIMEOUT_SECONDS must be a positive integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECONDS,
        };

        let log_json = vars
            .get("ROOM_RELAY_LOG_JSON")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Ok(Config {
            app_server_url,
            server_username,
            server_password,
            settings_path,
            http_timeout: Duration::from_secs(http_timeout_seconds),
            log_json,
        })
    }

    /// Logging configuration for the binary, given the debug-logging preference.
    #[must_use]
    pub fn logging(&self, debug_logging: bool) -> LoggingConfig {
        LoggingConfig::default()
            .with_debug(debug_logging)
            .with_json(self.log_json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    #[test]
    fn test_defaults_from_empty_env() {
        let config = Config::from_vars(&HashMap::new()).unwrap();

        assert_eq!(config.app_server_url, DEFAULT_APP_SERVER_URL);
        assert_eq!(config.server_username, "");
        assert_eq!(config.server_password.expose_secret(), "");
        assert!(config.settings_path.is_none());
        assert_eq!(
            config.http_timeout,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS)
        );
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let vars = HashMap::from([
            (
                "ROOM_RELAY_APP_SERVER_URL".to_string(),
                "http://localhost:3000/".to_string(),
            ),
            (
                "ROOM_RELAY_SERVER_USERNAME".to_string(),
                "demo".to_string(),
            ),
            (
                "ROOM_RELAY_SERVER_PASSWORD".to_string(),
                "pw".to_string(),
            ),
            (
                "ROOM_RELAY_SETTINGS_PATH".to_string(),
                "/tmp/relay-settings.json".to_string(),
            ),
            (
                "ROOM_RELAY_HTTP_TIMEOUT_SECONDS".to_string(),
                "3".to_string(),
            ),
            ("ROOM_RELAY_LOG_JSON".to_string(), "true".to_string()),
        ]);

        let config = Config::from_vars(&vars).unwrap();

        assert_eq!(config.app_server_url, "http://localhost:3000");
        assert_eq!(config.server_username, "demo");
        assert_eq!(config.server_password.expose_secret(), "pw");
        assert_eq!(
            config.settings_path,
            Some(PathBuf::from("/tmp/relay-settings.json"))
        );
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.log_json);
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let vars = HashMap::from([(
            "ROOM_RELAY_APP_SERVER_URL".to_string(),
            "sdk-snapshot.example.com".to_string(),
        )]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        for raw in ["0", "ten", "-1"] {
            let vars = HashMap::from([(
                "ROOM_RELAY_HTTP_TIMEOUT_SECONDS".to_string(),
                raw.to_string(),
            )]);
            assert!(
                matches!(Config::from_vars(&vars), Err(ConfigError::InvalidValue(_))),
                "timeout '{raw}' should be rejected"
            );
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let vars = HashMap::from([(
            "ROOM_RELAY_SERVER_PASSWORD".to_string(),
            "hunter2".to_string(),
        )]);
        let config = Config::from_vars(&vars).unwrap();

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_logging_follows_debug_preference() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        assert_eq!(
            config.logging(true).filter,
            common::config::DEBUG_LOG_FILTER
        );
        assert_eq!(
            config.logging(false).filter,
            common::config::DEFAULT_LOG_FILTER
        );
    }
}
