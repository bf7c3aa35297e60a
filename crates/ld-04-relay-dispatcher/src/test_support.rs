//! Shared fixture for dispatcher and reconciler tests.

use std::sync::Arc;
use std::time::Duration;

use ld_01_proof_verification::{Ed25519ProofVerifier, TagSigner};
use ld_02_campaign_ledger::{CampaignLedger, CampaignLedgerApi, InMemoryCampaignStore, NewCampaign};
use ld_03_claim_admission::{
    AdmissionService, ClaimAdmissionApi, ClaimLog, ClaimRequest, Reservation,
};
use shared_types::{
    Campaign, CampaignId, ClaimRecord, Geofence, ReservationRef, SystemTimeSource, TimeSource,
    WalletId,
};
use tokio::sync::mpsc;

use crate::adapters::simulated_ledger::SimulatedLedger;
use crate::domain::retry::RetryPolicy;
use crate::service::{DispatcherConfig, RelayDispatcher};

pub const REWARD: u64 = 1_000;

pub fn fast_config() -> DispatcherConfig {
    DispatcherConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2,
            max_delay: Duration::from_millis(5),
            attempt_timeout: Duration::from_millis(50),
            jitter: 0.0,
        },
        max_in_flight: 8,
        drain_timeout: Duration::from_secs(2),
    }
}

pub struct Harness {
    pub admission: Arc<AdmissionService>,
    pub campaigns: Arc<CampaignLedger>,
    pub chain: Arc<SimulatedLedger>,
    pub dispatcher: Arc<RelayDispatcher>,
    pub rx: mpsc::UnboundedReceiver<Reservation>,
    pub tag: TagSigner,
    pub campaign_id: CampaignId,
}

impl Harness {
    pub fn new(max_claims: u32, escrow: u64, config: DispatcherConfig) -> Self {
        let clock = Arc::new(SystemTimeSource);
        let campaigns = Arc::new(CampaignLedger::new(
            Arc::new(InMemoryCampaignStore::new()),
            clock.clone(),
        ));
        let tag = TagSigner::generate();
        let campaign_id = campaigns
            .register(NewCampaign {
                id: CampaignId::new("tacos"),
                onchain_id: 9,
                name: "Taco Tuesday".into(),
                merchant: WalletId([0xAA; 32]),
                reward_per_claim: REWARD,
                max_claims,
                expiry_ts: clock.now() + 3_600,
                tag_pubkey: tag.public_key(),
                geofence: Geofence {
                    latitude: 19.43,
                    longitude: -99.13,
                    radius_meters: 30,
                },
                metadata_uri: String::new(),
            })
            .expect("register campaign")
            .id;

        let (handle, rx) = RelayDispatcher::channel();
        let admission = Arc::new(AdmissionService::new(
            Arc::new(Ed25519ProofVerifier::default()),
            campaigns.clone(),
            Arc::new(ClaimLog::new()),
            Arc::new(handle),
        ));

        let chain = Arc::new(SimulatedLedger::new());
        chain.fund(&campaign_id, escrow);

        let dispatcher = Arc::new(RelayDispatcher::new(admission.clone(), chain.clone(), config));

        Self {
            admission,
            campaigns,
            chain,
            dispatcher,
            rx,
            tag,
            campaign_id,
        }
    }

    /// Admit a claim and take its reservation off the queue.
    pub fn admit(&mut self, who: u8) -> Reservation {
        let request = ClaimRequest {
            campaign_id: self.campaign_id.clone(),
            proof: self
                .tag
                .sign_visit(WalletId([who; 32]), SystemTimeSource.now(), 9),
        };
        let decision = self.admission.admit(&request);
        assert!(decision.is_accepted(), "admission refused: {decision:?}");
        self.rx.try_recv().expect("reservation queued")
    }

    pub fn record(&self, reference: &ReservationRef) -> ClaimRecord {
        self.admission.record(reference).expect("record exists")
    }

    pub fn campaign(&self) -> Campaign {
        self.campaigns.get(&self.campaign_id).expect("campaign exists")
    }
}
