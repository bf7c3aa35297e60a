//! # LootDrop Telemetry
//!
//! Logging and metrics shared by every LootDrop subsystem.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, human or JSON output
//! - **Metrics**: Prometheus counters, gauges and histograms in one registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lootdrop_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LD_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `LD_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `LD_SERVICE_NAME` | `lootdrop-relay` | Service name attached to startup logs |
//! | `LD_NETWORK` | `devnet` | Ledger network (devnet, testnet, mainnet) |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{gather_text, register_metrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize log subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        json_logs = config.json_logs,
        "telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Keeps telemetry active; logs on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}
