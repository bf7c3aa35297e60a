//! # Admission → Relay → Settlement
//!
//! Claims flow through the dispatcher to the simulated ledger and come back
//! as Confirmed, Rejected or Unknown on the claim record and campaign slot.

use std::time::Duration;

use ld_03_claim_admission::{ClaimAdmissionApi, ClaimDecision, RejectReason};
use ld_04_relay_dispatcher::{LedgerClientError, LedgerFault, Reconciler};
use shared_types::{CampaignStatus, CloseReason, RelayOutcome};

use super::fixtures::{fast_dispatch, wallet, World, REWARD};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accepted_claims_are_paid() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("pizza", 5);
    let (shutdown, job) = world.run_dispatcher();

    let mut references = Vec::new();
    for n in 0..5 {
        let decision = world.admit(&campaign, wallet(n));
        assert_eq!(decision.http_status(), 202);
        references.push(decision.reservation().cloned().unwrap());
    }

    for (n, reference) in references.iter().enumerate() {
        let record = world.settled(reference).await;
        assert_eq!(record.outcome, RelayOutcome::Confirmed);
        assert!(record.tx_ref.is_some());
        assert!(record.resolved_at.is_some());
        assert_eq!(world.chain.balance_of(&wallet(n as u32)), REWARD);
    }
    assert_eq!(world.chain.payout_count(), 5);
    assert_eq!(world.chain.escrow(&campaign.id), 0);

    shutdown.send(true).unwrap();
    let report = job.await.unwrap();
    assert_eq!(report.abandoned, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_slot_campaign() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("golden-ticket", 1);
    let (shutdown, job) = world.run_dispatcher();
    let alice = wallet(1);
    let bob = wallet(2);

    let reference = world.admit(&campaign, alice).reservation().cloned().unwrap();
    assert_eq!(world.settled(&reference).await.outcome, RelayOutcome::Confirmed);

    let state = world.get(&campaign.id);
    assert_eq!(state.status, CampaignStatus::Closed);
    assert_eq!(state.close_reason, Some(CloseReason::Exhausted));

    assert_eq!(
        world.admit(&campaign, bob),
        ClaimDecision::Rejected(RejectReason::Exhausted)
    );
    assert_eq!(
        world.admit(&campaign, alice),
        ClaimDecision::Rejected(RejectReason::AlreadyClaimed)
    );
    assert_eq!(world.chain.balance_of(&alice), REWARD);
    assert_eq!(world.chain.balance_of(&bob), 0);

    shutdown.send(true).unwrap();
    job.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rejected_relay_frees_slot_and_claimant() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign_with("underfunded", 1, 3_600, 0);
    let (shutdown, job) = world.run_dispatcher();
    let claimant = wallet(9);

    let first = world.admit(&campaign, claimant).reservation().cloned().unwrap();
    let record = world.settled(&first).await;
    assert_eq!(record.outcome, RelayOutcome::Rejected);
    assert!(record.rejection_reason.is_some());

    let state = world.get(&campaign.id);
    assert_eq!(state.claims_reserved, 0);
    assert_eq!(state.status, CampaignStatus::Active);

    world.chain.fund(&campaign.id, REWARD);
    let second = world.admit(&campaign, claimant).reservation().cloned().unwrap();
    assert_ne!(second, first);
    assert_eq!(world.settled(&second).await.outcome, RelayOutcome::Confirmed);
    assert_eq!(world.chain.balance_of(&claimant), REWARD);

    shutdown.send(true).unwrap();
    job.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_relays_pay_once() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("espresso", 3);
    let claimant = wallet(4);

    assert!(world.admit(&campaign, claimant).is_accepted());
    let reservation = world.drain_queue().pop().unwrap();
    let reference = reservation.reference.clone();

    let (a, b, c) = tokio::join!(
        world.dispatcher.relay(reservation.clone()),
        world.dispatcher.relay(reservation.clone()),
        world.dispatcher.relay(reservation),
    );
    assert_eq!([a, b, c], [RelayOutcome::Confirmed; 3]);

    assert_eq!(world.chain.payout_count(), 1);
    assert_eq!(world.chain.balance_of(&claimant), REWARD);
    assert_eq!(world.record(&reference).outcome, RelayOutcome::Confirmed);
    assert_eq!(world.get(&campaign.id).claims_reserved, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unknown_outcome_reconciled() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("lost-acks", 2);
    world
        .chain
        .script([LedgerFault::LostAck, LedgerFault::LostAck, LedgerFault::LostAck]);

    assert!(world.admit(&campaign, wallet(1)).is_accepted());
    let reservation = world.drain_queue().pop().unwrap();
    let reference = reservation.reference.clone();

    assert_eq!(world.dispatcher.relay(reservation).await, RelayOutcome::Unknown);
    let record = world.record(&reference);
    assert_eq!(record.relay_attempts, 3);
    assert_eq!(world.get(&campaign.id).claims_reserved, 1);
    assert_eq!(world.admission.unresolved().len(), 1);

    let reconciler = Reconciler::new(
        world.admission.clone(),
        world.chain.clone(),
        world.dispatcher.clone(),
        Duration::from_secs(30),
    );
    let report = reconciler.reconcile_once().await;
    assert_eq!(report.confirmed, 1);
    assert_eq!(world.record(&reference).outcome, RelayOutcome::Confirmed);
    assert_eq!(world.chain.payout_count(), 1);
    assert!(world.admission.unresolved().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_never_submitted_claim_resubmitted_by_reconciler() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("flaky-rpc", 2);
    let congested = || LedgerFault::Fail(LedgerClientError::Congested("slot skipped".into()));
    world.chain.script([congested(), congested(), congested()]);

    assert!(world.admit(&campaign, wallet(1)).is_accepted());
    let reservation = world.drain_queue().pop().unwrap();
    let reference = reservation.reference.clone();
    assert_eq!(world.dispatcher.relay(reservation).await, RelayOutcome::Unknown);
    assert_eq!(world.chain.payout_count(), 0);

    let reconciler = Reconciler::new(
        world.admission.clone(),
        world.chain.clone(),
        world.dispatcher.clone(),
        Duration::from_secs(30),
    );
    let report = reconciler.reconcile_once().await;
    assert_eq!(report.resubmitted, 1);
    assert_eq!(world.record(&reference).outcome, RelayOutcome::Confirmed);
    assert_eq!(world.chain.balance_of(&wallet(1)), REWARD);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_contended_campaign_pays_exactly_budget() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("stampede", 10);
    world.chain.set_latency(Duration::from_millis(2));
    let (shutdown, job) = world.run_dispatcher();

    let mut handles = Vec::new();
    for n in 0..30 {
        let request = world.request(&campaign, wallet(n));
        let admission = world.admission.clone();
        handles.push(tokio::spawn(async move { admission.admit(&request) }));
    }
    let mut accepted = Vec::new();
    for handle in handles {
        if let ClaimDecision::Accepted(reference) = handle.await.unwrap() {
            accepted.push(reference);
        }
    }
    assert_eq!(accepted.len(), 10);

    for reference in &accepted {
        assert_eq!(world.settled(reference).await.outcome, RelayOutcome::Confirmed);
    }
    assert_eq!(world.chain.payout_count(), 10);
    assert_eq!(world.chain.escrow(&campaign.id), 0);

    shutdown.send(true).unwrap();
    job.await.unwrap();
}
