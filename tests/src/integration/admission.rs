//! # Admission Under Concurrency
//!
//! Budget cap, per-claimant uniqueness and lazy expiry, exercised through the
//! real verifier, ledger and claim log with many tasks racing for one campaign.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ld_01_proof_verification::Ed25519ProofVerifier;
use ld_02_campaign_ledger::{CampaignLedger, CampaignLedgerApi};
use ld_03_claim_admission::{
    AdmissionService, ClaimAdmissionApi, ClaimDecision, ClaimLog, ClaimRequest, RejectReason,
    RelayQueue, RelayQueueError, Reservation,
};
use shared_types::{CampaignId, CampaignStatus, CloseReason, RelayOutcome, TimeSource};

use super::fixtures::{fast_dispatch, wallet, World, MERCHANT};

async fn race(world: &World, requests: Vec<ClaimRequest>) -> Vec<ClaimDecision> {
    let mut handles = Vec::with_capacity(requests.len());
    for request in requests {
        let admission = world.admission.clone();
        handles.push(tokio::spawn(async move { admission.admit(&request) }));
    }
    let mut decisions = Vec::with_capacity(handles.len());
    for handle in handles {
        decisions.push(handle.await.expect("admit task panicked"));
    }
    decisions
}

fn tally(decisions: &[ClaimDecision]) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for d in decisions {
        *counts.entry(d.label()).or_insert(0) += 1;
    }
    counts
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_claims_never_exceed_budget() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("pizza", 10);

    let requests = (0..50).map(|n| world.request(&campaign, wallet(n))).collect();
    let decisions = race(&world, requests).await;
    let counts = tally(&decisions);

    assert_eq!(counts.get("accepted"), Some(&10));
    assert_eq!(counts.get("exhausted"), Some(&40));

    let state = world.get(&campaign.id);
    assert_eq!(state.claims_reserved, 10);
    assert_eq!(state.status, CampaignStatus::Closed);
    assert_eq!(state.close_reason, Some(CloseReason::Exhausted));
    assert_eq!(world.log.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_duplicates_admit_once() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("coffee", 100);
    let claimant = wallet(7);

    let requests = (0..25).map(|_| world.request(&campaign, claimant)).collect();
    let decisions = race(&world, requests).await;
    let counts = tally(&decisions);

    assert_eq!(counts.get("accepted"), Some(&1));
    assert_eq!(counts.get("already_claimed"), Some(&24));
    assert_eq!(world.get(&campaign.id).claims_reserved, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_mixed_duplicates_and_budget() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("bagels", 25);

    let requests = (0..40)
        .flat_map(|n| (0..3).map(move |_| n))
        .map(|n| world.request(&campaign, wallet(n)))
        .collect();
    let decisions = race(&world, requests).await;

    let accepted: Vec<_> = decisions.iter().filter_map(|d| d.reservation()).collect();
    assert_eq!(accepted.len(), 25);

    let mut sequences: Vec<u64> = accepted.iter().map(|r| r.sequence).collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (0..25).collect::<Vec<u64>>());

    let claimants: HashSet<_> = world
        .log
        .snapshot()
        .into_iter()
        .map(|r| r.claimant)
        .collect();
    assert_eq!(claimants.len(), 25);
    assert_eq!(world.get(&campaign.id).claims_reserved, 25);
}

#[tokio::test]
async fn test_expired_campaign_rejects_and_reports_expired() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign_with("late", 5, 60, 0);

    assert!(world.admit(&campaign, wallet(1)).is_accepted());

    world.clock.advance(60);
    let decision = world.admit(&campaign, wallet(2));
    assert_eq!(decision, ClaimDecision::Rejected(RejectReason::Expired));
    assert_eq!(decision.http_status(), 410);

    let state = world.get(&campaign.id);
    assert_eq!(state.status, CampaignStatus::Expired);
    assert_eq!(state.claims_reserved, 1);
}

#[tokio::test]
async fn test_expiry_one_second_ago() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign_with("flash", 5, 10, 0);
    world.clock.advance(11);

    assert_eq!(world.get(&campaign.id).expiry_ts, world.clock.now() - 1);
    assert_eq!(
        world.admit(&campaign, wallet(1)),
        ClaimDecision::Rejected(RejectReason::Expired)
    );
    assert_eq!(world.get(&campaign.id).status, CampaignStatus::Expired);
    assert!(world.log.is_empty());
}

#[tokio::test]
async fn test_proof_failures_map_to_bad_proof() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("tacos", 5);
    let other = world.campaign("burritos", 5);

    // truncated signature
    let mut request = world.request(&campaign, wallet(1));
    request.proof.signature.truncate(10);
    assert_eq!(
        world.admission.admit(&request),
        ClaimDecision::Rejected(RejectReason::BadProof)
    );

    // tampered payload
    let mut request = world.request(&campaign, wallet(1));
    request.proof.payload[0] ^= 0xFF;
    assert_eq!(
        world.admission.admit(&request).rejection(),
        Some(RejectReason::BadProof)
    );

    // proof signed by another campaign's tag
    let mut request = world.request(&other, wallet(1));
    request.campaign_id = campaign.id.clone();
    assert_eq!(
        world.admission.admit(&request).rejection(),
        Some(RejectReason::BadProof)
    );

    // right tag, wrong on-chain campaign number
    let request = ClaimRequest {
        campaign_id: campaign.id.clone(),
        proof: campaign
            .tag
            .sign_visit(wallet(1), world.clock.now(), other.onchain_id),
    };
    assert_eq!(
        world.admission.admit(&request).rejection(),
        Some(RejectReason::BadProof)
    );

    // stale tap
    let request = world.request(&campaign, wallet(1));
    world.clock.advance(301);
    assert_eq!(
        world.admission.admit(&request).rejection(),
        Some(RejectReason::BadProof)
    );

    assert_eq!(world.get(&campaign.id).claims_reserved, 0);
    assert!(world.admit(&campaign, wallet(1)).is_accepted());
}

#[tokio::test]
async fn test_unknown_campaign() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("tacos", 5);
    let mut request = world.request(&campaign, wallet(1));
    request.campaign_id = CampaignId::new("ghost");

    let decision = world.admission.admit(&request);
    assert_eq!(decision, ClaimDecision::Rejected(RejectReason::NoSuchCampaign));
    assert_eq!(decision.http_status(), 404);
}

#[tokio::test]
async fn test_paused_campaign_rejects_until_resumed() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("donuts", 5);

    world.ledger.pause(&campaign.id, &MERCHANT).unwrap();
    assert_eq!(
        world.admit(&campaign, wallet(1)),
        ClaimDecision::Rejected(RejectReason::NotActive)
    );

    world.ledger.resume(&campaign.id, &MERCHANT).unwrap();
    assert!(world.admit(&campaign, wallet(1)).is_accepted());

    world.ledger.close(&campaign.id, &MERCHANT).unwrap();
    assert_eq!(
        world.admit(&campaign, wallet(2)).rejection(),
        Some(RejectReason::NotActive)
    );
}

struct DiscardQueue;

impl RelayQueue for DiscardQueue {
    fn enqueue(&self, _reservation: Reservation) -> Result<(), RelayQueueError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_claimants_survive_cache_rebuild_from_store() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign("ramen", 3);
    assert!(world.admit(&campaign, wallet(1)).is_accepted());

    // A second process sharing the store starts cold.
    let ledger = Arc::new(CampaignLedger::new(world.store.clone(), world.clock.clone()));
    assert_eq!(ledger.warm_start().unwrap(), 1);
    let admission = AdmissionService::new(
        Arc::new(Ed25519ProofVerifier::default()),
        ledger.clone(),
        Arc::new(ClaimLog::new()),
        Arc::new(DiscardQueue),
    );

    let repeat = world.request(&campaign, wallet(1));
    assert_eq!(
        admission.admit(&repeat).rejection(),
        Some(RejectReason::AlreadyClaimed)
    );

    let fresh = world.request(&campaign, wallet(2));
    let reference = admission.admit(&fresh).reservation().cloned().unwrap();
    assert_eq!(reference.sequence, 1);
    assert_eq!(ledger.get(&campaign.id).unwrap().claims_reserved, 2);
    assert_eq!(
        admission.record(&reference).unwrap().outcome,
        RelayOutcome::Pending
    );
}
