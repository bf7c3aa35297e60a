//! # LootDrop Engine
//!
//! Owns every subsystem for the life of the process.
//!
//! ## Startup Sequence
//!
//! 1. Warm the campaign cache from the store
//! 2. Build claim log, verifier and admission service
//! 3. Spawn the relay dispatcher worker
//! 4. Spawn the reconciliation job (first pass runs immediately)
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown; the dispatcher stops taking new reservations
//! 2. Queued and in-flight relays get until the drain deadline
//! 3. Relays still running at the deadline are marked Unknown
//! 4. Wait for both workers to exit; the reconciler gets the same deadline

use std::sync::Arc;

use anyhow::{Context, Result};
use ld_01_proof_verification::Ed25519ProofVerifier;
use ld_02_campaign_ledger::{CampaignLedger, CampaignLedgerApi, CampaignStore};
use ld_03_claim_admission::{
    AdmissionService, ClaimAdmissionApi, ClaimDecision, ClaimLog, ClaimRequest,
};
use ld_04_relay_dispatcher::{DrainReport, LedgerClient, Reconciler, RelayDispatcher};
use ld_05_analytics::{AnalyticsApi, AnalyticsService};
use parking_lot::Mutex;
use shared_types::{Campaign, TimeSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{CampaignSeed, RuntimeConfig};

struct Workers {
    dispatcher: JoinHandle<DrainReport>,
    reconciler: JoinHandle<()>,
}

/// The running relay.
pub struct LootDropEngine {
    config: RuntimeConfig,
    ledger: Arc<CampaignLedger>,
    claim_log: Arc<ClaimLog>,
    admission: Arc<AdmissionService>,
    dispatcher: Arc<RelayDispatcher>,
    analytics: AnalyticsService,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<Option<Workers>>,
}

impl LootDropEngine {
    /// Build and start the engine. Must be called inside a Tokio runtime.
    pub fn start(
        config: RuntimeConfig,
        store: Arc<dyn CampaignStore>,
        client: Arc<dyn LedgerClient>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        config.validate().context("invalid runtime configuration")?;

        let ledger = Arc::new(CampaignLedger::new(store, clock.clone()));
        let warmed = ledger
            .warm_start()
            .context("failed to load campaigns from store")?;

        let claim_log = Arc::new(ClaimLog::new());
        let verifier = Arc::new(Ed25519ProofVerifier::new(config.proof_max_skew_secs));
        let (handle, rx) = RelayDispatcher::channel();
        let admission = Arc::new(AdmissionService::new(
            verifier,
            ledger.clone(),
            claim_log.clone(),
            Arc::new(handle),
        ));

        let dispatcher = Arc::new(RelayDispatcher::new(
            admission.clone(),
            client.clone(),
            config.dispatcher.clone(),
        ));
        let reconciler = Reconciler::new(
            admission.clone(),
            client,
            dispatcher.clone(),
            config.reconcile_interval,
        );
        let analytics = AnalyticsService::new(ledger.clone(), claim_log.clone(), clock);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let workers = Workers {
            dispatcher: tokio::spawn(dispatcher.clone().run(rx, shutdown_rx.clone())),
            reconciler: tokio::spawn(reconciler.run(shutdown_rx)),
        };

        info!(
            campaigns = warmed,
            max_in_flight = config.dispatcher.max_in_flight,
            max_attempts = config.dispatcher.retry.max_attempts,
            reconcile_interval_secs = config.reconcile_interval.as_secs(),
            "LootDrop engine started"
        );

        Ok(Self {
            config,
            ledger,
            claim_log,
            admission,
            dispatcher,
            analytics,
            shutdown_tx,
            workers: Mutex::new(Some(workers)),
        })
    }

    /// Register seed campaigns, skipping ids that already exist.
    pub fn seed(&self, seeds: &[CampaignSeed]) -> Result<Vec<Campaign>> {
        let mut registered = Vec::new();
        for seed in seeds {
            let id = seed.campaign.id.clone();
            if self.ledger.get(&id).is_ok() {
                warn!(campaign_id = %id, "seed campaign already registered, skipping");
                continue;
            }
            let campaign = self
                .ledger
                .register(seed.campaign.clone())
                .with_context(|| format!("failed to register seed campaign {id}"))?;
            registered.push(campaign);
        }
        Ok(registered)
    }

    pub fn admit(&self, request: &ClaimRequest) -> ClaimDecision {
        self.admission.admit(request)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<CampaignLedger> {
        &self.ledger
    }

    pub fn claims(&self) -> &Arc<ClaimLog> {
        &self.claim_log
    }

    pub fn admission(&self) -> &Arc<AdmissionService> {
        &self.admission
    }

    pub fn dispatcher(&self) -> &Arc<RelayDispatcher> {
        &self.dispatcher
    }

    pub fn analytics(&self) -> &dyn AnalyticsApi {
        &self.analytics
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Stop intake and drain relays. Calling it twice returns an empty report.
    pub async fn shutdown(&self) -> DrainReport {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let Some(workers) = self.workers.lock().take() else {
            return DrainReport::default();
        };

        let report = match workers.dispatcher.await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "relay dispatcher task failed");
                DrainReport::default()
            }
        };
        let mut reconciler = workers.reconciler;
        match tokio::time::timeout(self.config.dispatcher.drain_timeout, &mut reconciler).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "reconciler task failed"),
            Err(_) => {
                warn!("reconciler missed the drain deadline, aborting");
                reconciler.abort();
            }
        }

        info!(
            completed = report.completed,
            abandoned = report.abandoned,
            unresolved = self.admission.unresolved().len(),
            "Shutdown complete"
        );
        report
    }
}
