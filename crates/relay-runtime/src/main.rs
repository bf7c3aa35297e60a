//! # LootDrop Relay
//!
//! Runs the claim admission and payout relay against the simulated ledger.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`LD_LOG_LEVEL`, `LD_JSON_LOGS`, ...)
//! 2. Load runtime configuration (`LD_RELAY_*`, `LD_RECONCILE_*`, ...)
//! 3. Start the engine
//! 4. Register and fund campaigns from `LD_CAMPAIGNS_FILE`, if set
//! 5. Run until Ctrl+C, then drain

use std::sync::Arc;

use anyhow::{Context, Result};
use ld_02_campaign_ledger::InMemoryCampaignStore;
use ld_04_relay_dispatcher::SimulatedLedger;
use ld_05_analytics::ClaimFilter;
use lootdrop_telemetry::{gather_text, init_telemetry, TelemetryConfig};
use relay_runtime::{CampaignSeed, LootDropEngine, RuntimeConfig};
use shared_types::SystemTimeSource;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    telemetry.validate()?;
    let _guard = init_telemetry(telemetry)?;

    let config = RuntimeConfig::from_env().context("failed to load runtime configuration")?;

    let chain = Arc::new(SimulatedLedger::new());
    let engine = LootDropEngine::start(
        config.clone(),
        Arc::new(InMemoryCampaignStore::new()),
        chain.clone(),
        Arc::new(SystemTimeSource),
    )?;

    if let Some(path) = &config.campaigns_file {
        let seeds = CampaignSeed::load_file(path)?;
        let registered = engine.seed(&seeds)?;
        for seed in &seeds {
            chain.fund(&seed.campaign.id, seed.escrow());
        }
        info!(
            file = %path.display(),
            registered = registered.len(),
            "Seed campaigns loaded"
        );
    }

    info!("Relay is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    engine.shutdown().await;

    let summary = engine.analytics().summarize(&ClaimFilter::default());
    info!(
        campaigns = summary.total_campaigns,
        confirmed = summary.confirmed_claims,
        distributed = summary.lamports_distributed,
        unique_claimers = summary.unique_claimers,
        "Final claim summary"
    );
    debug!(metrics = %gather_text()?, "Final metrics");

    Ok(())
}
