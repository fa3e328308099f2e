//! # Store Telemetry
//!
//! Console logging for applications built on `signal-store`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use store_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).ok();
//!
//!     // Store diagnostics and `TracingLogSink` output now reach the console
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIGNAL_STORE_LOG_LEVEL` | `RUST_LOG`, then `info` | Filter directives |
//! | `SIGNAL_STORE_JSON_LOGS` | `false` | JSON lines instead of human output |
//! | `SIGNAL_STORE_CONSOLE_OUTPUT` | `true` | Disable to install a silent subscriber |

mod config;
mod logging;

pub use config::{TelemetryConfig, ENV_CONSOLE_OUTPUT, ENV_JSON_LOGS, ENV_LOG_LEVEL};
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter `{directives}`: {reason}")]
    InvalidFilter { directives: String, reason: String },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}
