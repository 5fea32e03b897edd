//! Bridge configuration.
//!
//! # Example
//!
//! ```ignore
//! use packet_router::domain::{BridgeConfig, SilentSendMode};
//!
//! let config = BridgeConfig::default()
//!     .with_silent_send(SilentSendMode::Legacy)
//!     .with_observer_isolation(true);
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::BridgeError;

/// How the silent-send call convention is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SilentSendMode {
    /// Probe the transport once at construction.
    #[default]
    Auto,
    /// Force the 3-argument convention.
    Legacy,
    /// Force the 4-argument convention (marker + filtered flag).
    Marked,
}

impl FromStr for SilentSendMode {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SilentSendMode::Auto),
            "legacy" => Ok(SilentSendMode::Legacy),
            "marked" => Ok(SilentSendMode::Marked),
            other => Err(BridgeError::InvalidConfig(format!(
                "unknown silent send mode '{other}' (expected auto, legacy or marked)"
            ))),
        }
    }
}

/// Router and gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Silent-send convention selection.
    pub silent_send: SilentSendMode,
    /// Log and skip failing observers instead of aborting the dispatch.
    pub isolate_observer_failures: bool,
}

impl BridgeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PB_SILENT_SEND`: `auto`, `legacy` or `marked` (default: auto)
    /// - `PB_ISOLATE_OBSERVER_FAILURES`: `true`/`1` or `false`/`0` (default: false)
    pub fn from_env() -> Result<Self, BridgeError> {
        let mut config = Self::default();

        if let Ok(mode) = env::var("PB_SILENT_SEND") {
            config.silent_send = mode.parse()?;
        }

        if let Ok(flag) = env::var("PB_ISOLATE_OBSERVER_FAILURES") {
            config.isolate_observer_failures = parse_flag("PB_ISOLATE_OBSERVER_FAILURES", &flag)?;
        }

        Ok(config)
    }

    pub fn with_silent_send(mut self, mode: SilentSendMode) -> Self {
        self.silent_send = mode;
        self
    }

    pub fn with_observer_isolation(mut self, isolate: bool) -> Self {
        self.isolate_observer_failures = isolate;
        self
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, BridgeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(BridgeError::InvalidConfig(format!(
            "{name} must be true or false, got '{other}'"
        ))),
    }
}
