//! # Bridge Telemetry
//!
//! Logging bootstrap for processes embedding the packet bridge.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Router and gateway logs are now collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PB_SERVICE_NAME` | `packet-bridge` | Service name in log lines |
//! | `PB_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `PB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `PB_JSON_LOGS` | `false` | JSON formatted output |

mod config;
mod logging;
mod subscriber;

pub use config::TelemetryConfig;
pub use subscriber::build_filter;

use thiserror::Error;

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Telemetry already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global log subscriber.
///
/// Returns a guard that should be held for the lifetime of the process. A
/// second call fails with [`TelemetryError::AlreadyInitialized`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    subscriber::init_subscriber(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
