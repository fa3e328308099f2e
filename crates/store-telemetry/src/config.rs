//! Telemetry configuration from environment variables.

use std::env;

/// Log level variable checked first.
pub const ENV_LOG_LEVEL: &str = "SIGNAL_STORE_LOG_LEVEL";

/// JSON output switch.
pub const ENV_JSON_LOGS: &str = "SIGNAL_STORE_JSON_LOGS";

/// Console output switch.
pub const ENV_CONSOLE_OUTPUT: &str = "SIGNAL_STORE_CONSOLE_OUTPUT";

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Application name attached to the startup event
    pub service_name: String,

    /// Filter directives (`info`, `signal_store=debug,warn`, ...)
    pub log_level: String,

    /// Whether to write anything to the console
    pub console_output: bool,

    /// Whether to emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "signal-store".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SIGNAL_STORE_LOG_LEVEL` or `RUST_LOG`: filter (default: info)
    /// - `SIGNAL_STORE_JSON_LOGS`: JSON output (default: false)
    /// - `SIGNAL_STORE_CONSOLE_OUTPUT`: console output (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            service_name: defaults.service_name,

            log_level: lookup(ENV_LOG_LEVEL)
                .or_else(|| lookup("RUST_LOG"))
                .filter(|level| !level.trim().is_empty())
                .unwrap_or(defaults.log_level),

            console_output: lookup(ENV_CONSOLE_OUTPUT)
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup(ENV_JSON_LOGS)
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Set the application name.
    pub fn for_service(service_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = service_name.to_string();
        config
    }
}
