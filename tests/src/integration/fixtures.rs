//! Shared test world.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ld_01_proof_verification::{Ed25519ProofVerifier, TagSigner};
use ld_02_campaign_ledger::{CampaignLedger, CampaignLedgerApi, InMemoryCampaignStore, NewCampaign};
use ld_03_claim_admission::{
    AdmissionService, ClaimAdmissionApi, ClaimDecision, ClaimLog, ClaimRequest, Reservation,
};
use ld_04_relay_dispatcher::{DispatcherConfig, DrainReport, RelayDispatcher, RetryPolicy, SimulatedLedger};
use shared_types::{
    Campaign, CampaignId, ClaimRecord, Geofence, Lamports, ManualClock, RelayOutcome,
    ReservationRef, TimeSource, WalletId,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const START: i64 = 1_750_000_000;
pub const REWARD: Lamports = 5_000;
pub const MERCHANT: WalletId = WalletId([0xEE; 32]);

pub fn wallet(n: u32) -> WalletId {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&n.to_le_bytes());
    bytes[31] = 0x01;
    WalletId(bytes)
}

pub fn fast_dispatch() -> DispatcherConfig {
    DispatcherConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2,
            max_delay: Duration::from_millis(4),
            attempt_timeout: Duration::from_millis(100),
            jitter: 0.0,
        },
        max_in_flight: 16,
        drain_timeout: Duration::from_secs(2),
    }
}

/// A campaign plus the tag that signs its proofs.
pub struct LiveCampaign {
    pub id: CampaignId,
    pub onchain_id: u64,
    pub tag: TagSigner,
}

pub struct World {
    pub clock: Arc<ManualClock>,
    pub store: Arc<InMemoryCampaignStore>,
    pub ledger: Arc<CampaignLedger>,
    pub log: Arc<ClaimLog>,
    pub admission: Arc<AdmissionService>,
    pub chain: Arc<SimulatedLedger>,
    pub dispatcher: Arc<RelayDispatcher>,
    rx: Option<mpsc::UnboundedReceiver<Reservation>>,
    next_onchain_id: AtomicU64,
}

impl World {
    pub fn new(config: DispatcherConfig) -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(InMemoryCampaignStore::new());
        let ledger = Arc::new(CampaignLedger::new(store.clone(), clock.clone()));
        let log = Arc::new(ClaimLog::new());
        let (handle, rx) = RelayDispatcher::channel();
        let admission = Arc::new(AdmissionService::new(
            Arc::new(Ed25519ProofVerifier::default()),
            ledger.clone(),
            log.clone(),
            Arc::new(handle),
        ));
        let chain = Arc::new(SimulatedLedger::new());
        let dispatcher = Arc::new(RelayDispatcher::new(admission.clone(), chain.clone(), config));

        Self {
            clock,
            store,
            ledger,
            log,
            admission,
            chain,
            dispatcher,
            rx: Some(rx),
            next_onchain_id: AtomicU64::new(1),
        }
    }

    /// Register a funded campaign expiring in an hour.
    pub fn campaign(&self, id: &str, max_claims: u32) -> LiveCampaign {
        self.campaign_with(id, max_claims, 3_600, REWARD * u64::from(max_claims))
    }

    pub fn campaign_with(&self, id: &str, max_claims: u32, expires_in: i64, escrow: Lamports) -> LiveCampaign {
        let tag = TagSigner::generate();
        let onchain_id = self
            .next_onchain_id
            .fetch_add(1, Ordering::SeqCst);
        let campaign = self
            .ledger
            .register(NewCampaign {
                id: CampaignId::new(id),
                onchain_id,
                name: format!("{id} drop"),
                merchant: MERCHANT,
                reward_per_claim: REWARD,
                max_claims,
                expiry_ts: self.clock.now() + expires_in,
                tag_pubkey: tag.public_key(),
                geofence: Geofence {
                    latitude: 40.7128,
                    longitude: -74.006,
                    radius_meters: 50,
                },
                metadata_uri: String::new(),
            })
            .expect("register campaign");
        self.chain.fund(&campaign.id, escrow);
        LiveCampaign {
            id: campaign.id,
            onchain_id,
            tag,
        }
    }

    pub fn request(&self, campaign: &LiveCampaign, claimant: WalletId) -> ClaimRequest {
        ClaimRequest {
            campaign_id: campaign.id.clone(),
            proof: campaign
                .tag
                .sign_visit(claimant, self.clock.now(), campaign.onchain_id),
        }
    }

    pub fn admit(&self, campaign: &LiveCampaign, claimant: WalletId) -> ClaimDecision {
        self.admission.admit(&self.request(campaign, claimant))
    }

    pub fn get(&self, id: &CampaignId) -> Campaign {
        self.ledger.get(id).expect("campaign exists")
    }

    pub fn record(&self, reference: &ReservationRef) -> ClaimRecord {
        self.admission.record(reference).expect("record exists")
    }

    /// Spawn the dispatcher worker. Returns the shutdown sender and its join handle.
    pub fn run_dispatcher(&mut self) -> (watch::Sender<bool>, JoinHandle<DrainReport>) {
        let rx = self.rx.take().expect("dispatcher already running");
        let (tx, shutdown) = watch::channel(false);
        let job = tokio::spawn(self.dispatcher.clone().run(rx, shutdown));
        (tx, job)
    }

    /// Take everything admission queued so far without relaying it.
    pub fn drain_queue(&mut self) -> Vec<Reservation> {
        let rx = self.rx.as_mut().expect("dispatcher already running");
        let mut out = Vec::new();
        while let Ok(r) = rx.try_recv() {
            out.push(r);
        }
        out
    }

    /// Poll until the record leaves Pending, or give up after two seconds.
    pub async fn settled(&self, reference: &ReservationRef) -> ClaimRecord {
        for _ in 0..200 {
            let record = self.record(reference);
            if record.outcome != RelayOutcome::Pending {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.record(reference)
    }
}
