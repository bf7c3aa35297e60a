//! Telemetry configuration from environment variables.

use std::env;

use crate::TelemetryError;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to startup and shutdown logs
    pub service_name: String,

    /// Log filter directive (trace, debug, info, ... or full EnvFilter syntax)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Ledger network identifier (devnet, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "lootdrop-relay".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LD_SERVICE_NAME`: Service name (default: lootdrop-relay)
    /// - `LD_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LD_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `LD_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("LD_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("LD_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("LD_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.json_logs),
            network: lookup("LD_NETWORK").unwrap_or(defaults.network),
        }
    }

    /// Reject networks the relay does not know how to talk to.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        match self.network.as_str() {
            "devnet" | "testnet" | "mainnet" | "localnet" => Ok(()),
            other => Err(TelemetryError::Config(format!("unknown network: {other}"))),
        }
    }
}
