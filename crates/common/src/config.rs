//! Common configuration types for Room Relay components.

use serde::{Deserialize, Serialize};

/// Default tracing filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "relay=info,room_relay=info";

/// Tracing filter directive used when debug logging is switched on.
pub const DEBUG_LOG_FILTER: &str = "relay=debug,room_relay=debug";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full `EnvFilter` string)
    pub filter: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
        }
    }
}

impl LoggingConfig {
    /// Pick the filter from the debug-logging preference.
    #[must_use]
    pub fn with_debug(mut self, debug_logging: bool) -> Self {
        self.filter = if debug_logging {
            DEBUG_LOG_FILTER.to_string()
        } else {
            DEFAULT_LOG_FILTER.to_string()
        };
        self
    }

    /// Enable or disable JSON output.
    #[must_use]
    pub fn with_json(mut self, json_logs: bool) -> Self {
        self.json_logs = json_logs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_info_plain_text() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter, DEFAULT_LOG_FILTER);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_debug_toggle_switches_filter() {
        let config = LoggingConfig::default().with_debug(true);
        assert_eq!(config.filter, DEBUG_LOG_FILTER);

        let config = config.with_debug(false).with_json(true);
        assert_eq!(config.filter, DEFAULT_LOG_FILTER);
        assert!(config.json_logs);
    }
}
