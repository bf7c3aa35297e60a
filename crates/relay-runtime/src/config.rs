//! # Runtime Configuration
//!
//! Relay tuning from `LD_*` environment variables, plus the optional JSON
//! campaign seed file.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LD_PROOF_MAX_SKEW_SECS` | 300 |
//! | `LD_RELAY_MAX_ATTEMPTS` | 5 |
//! | `LD_RELAY_BASE_DELAY_MS` | 200 |
//! | `LD_RELAY_MAX_DELAY_MS` | 5000 |
//! | `LD_RELAY_ATTEMPT_TIMEOUT_MS` | 10000 |
//! | `LD_RELAY_JITTER` | 0.0 |
//! | `LD_RELAY_MAX_IN_FLIGHT` | 64 |
//! | `LD_RECONCILE_INTERVAL_SECS` | 30 |
//! | `LD_DRAIN_TIMEOUT_SECS` | 15 |
//! | `LD_CAMPAIGNS_FILE` | unset |

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ld_01_proof_verification::DEFAULT_MAX_SKEW_SECS;
use ld_02_campaign_ledger::NewCampaign;
use ld_04_relay_dispatcher::{DispatcherConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use shared_types::Lamports;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("Failed to read campaign file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse campaign file {path}: {source}")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Accepted clock difference between a tap and admission.
    pub proof_max_skew_secs: i64,
    pub dispatcher: DispatcherConfig,
    /// Period of the reconciliation pass over Unknown records.
    pub reconcile_interval: Duration,
    /// Campaigns registered at start.
    pub campaigns_file: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            proof_max_skew_secs: DEFAULT_MAX_SKEW_SECS,
            dispatcher: DispatcherConfig::default(),
            reconcile_interval: Duration::from_secs(30),
            campaigns_file: None,
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let retry = &mut config.dispatcher.retry;

        if let Some(v) = parse(&lookup, "LD_PROOF_MAX_SKEW_SECS")? {
            config.proof_max_skew_secs = v;
        }
        if let Some(v) = parse(&lookup, "LD_RELAY_MAX_ATTEMPTS")? {
            retry.max_attempts = v;
        }
        if let Some(v) = parse(&lookup, "LD_RELAY_BASE_DELAY_MS")? {
            retry.base_delay = Duration::from_millis(v);
        }
        if let Some(v) = parse(&lookup, "LD_RELAY_MAX_DELAY_MS")? {
            retry.max_delay = Duration::from_millis(v);
        }
        if let Some(v) = parse(&lookup, "LD_RELAY_ATTEMPT_TIMEOUT_MS")? {
            retry.attempt_timeout = Duration::from_millis(v);
        }
        if let Some(v) = parse::<f64>(&lookup, "LD_RELAY_JITTER")? {
            retry.jitter = v.clamp(0.0, 1.0);
        }
        if let Some(v) = parse(&lookup, "LD_RELAY_MAX_IN_FLIGHT")? {
            config.dispatcher.max_in_flight = v;
        }
        if let Some(v) = parse(&lookup, "LD_RECONCILE_INTERVAL_SECS")? {
            config.reconcile_interval = Duration::from_secs(v);
        }
        if let Some(v) = parse(&lookup, "LD_DRAIN_TIMEOUT_SECS")? {
            config.dispatcher.drain_timeout = Duration::from_secs(v);
        }
        config.campaigns_file = lookup("LD_CAMPAIGNS_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let retry = &self.dispatcher.retry;
        if self.proof_max_skew_secs <= 0 {
            return Err(ConfigError::Zero {
                key: "LD_PROOF_MAX_SKEW_SECS",
            });
        }
        if retry.max_attempts == 0 {
            return Err(ConfigError::Zero {
                key: "LD_RELAY_MAX_ATTEMPTS",
            });
        }
        if retry.attempt_timeout.is_zero() {
            return Err(ConfigError::Zero {
                key: "LD_RELAY_ATTEMPT_TIMEOUT_MS",
            });
        }
        if self.dispatcher.max_in_flight == 0 {
            return Err(ConfigError::Zero {
                key: "LD_RELAY_MAX_IN_FLIGHT",
            });
        }
        if self.reconcile_interval.is_zero() {
            return Err(ConfigError::Zero {
                key: "LD_RECONCILE_INTERVAL_SECS",
            });
        }
        Ok(())
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.dispatcher.retry
    }
}

/// One entry of the campaign seed file.
///
/// `escrow` defaults to `reward_per_claim * max_claims`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSeed {
    #[serde(flatten)]
    pub campaign: NewCampaign,
    #[serde(default)]
    pub escrow: Option<Lamports>,
}

impl CampaignSeed {
    pub fn escrow(&self) -> Lamports {
        self.escrow
            .or_else(|| self.campaign.escrow_required())
            .unwrap_or(0)
    }

    /// Read a JSON array of seeds.
    pub fn load_file(path: &Path) -> Result<Vec<Self>, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::SeedParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
