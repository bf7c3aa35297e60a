//! # Analytics Over Relayed Claims

use ld_03_claim_admission::{ClaimAdmissionApi, RelayResolution};
use ld_04_relay_dispatcher::LedgerFault;
use ld_05_analytics::{AnalyticsApi, AnalyticsService, ClaimFilter};
use shared_types::{CampaignStatus, RelayOutcome, TimeSource, TxRef, WalletId};

use super::fixtures::{fast_dispatch, wallet, World, MERCHANT, REWARD};

fn analytics(world: &World) -> AnalyticsService {
    AnalyticsService::new(world.ledger.clone(), world.log.clone(), world.clock.clone())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_summary_counts_only_confirmed_payouts() {
    let mut world = World::new(fast_dispatch());
    let pizza = world.campaign("pizza", 5);
    let coffee = world.campaign_with("coffee", 5, 3_600, 0);
    let (shutdown, job) = world.run_dispatcher();

    let mut references = Vec::new();
    for n in 0..3 {
        references.push(world.admit(&pizza, wallet(n)).reservation().cloned().unwrap());
    }
    // unfunded: relayed but rejected
    references.push(world.admit(&coffee, wallet(0)).reservation().cloned().unwrap());
    for reference in &references {
        world.settled(reference).await;
    }

    let service = analytics(&world);
    let summary = service.summarize(&ClaimFilter::default());
    assert_eq!(summary.total_campaigns, 2);
    assert_eq!(summary.active_campaigns, 2);
    assert_eq!(summary.confirmed_claims, 3);
    assert_eq!(summary.lamports_distributed, 3 * REWARD);
    assert_eq!(summary.unique_claimers, 3);
    assert_eq!(summary.claims_last_24h, 3);
    assert_eq!(summary.claims_last_7d, 3);
    assert_eq!(summary.top_campaigns.len(), 1);
    assert_eq!(summary.top_campaigns[0].campaign_id, pizza.id);
    assert_eq!(summary.top_campaigns[0].confirmed_claims, 3);

    let report = service.campaign_report(&pizza.id).unwrap();
    assert_eq!(report.confirmed_claims, 3);
    assert_eq!(report.remaining_budget, 2 * REWARD);
    assert!((report.claim_rate - 0.6).abs() < 1e-9);

    let coffee_report = service.campaign_report(&coffee.id).unwrap();
    assert_eq!(coffee_report.confirmed_claims, 0);
    assert_eq!(coffee_report.claim_rate, 0.0);

    shutdown.send(true).unwrap();
    job.await.unwrap();
}

#[tokio::test]
async fn test_unknown_claims_hold_budget_but_are_not_distributed() {
    let mut world = World::new(fast_dispatch());
    let campaign = world.campaign("limbo", 4);
    world
        .chain
        .script([LedgerFault::Stall, LedgerFault::Stall, LedgerFault::Stall]);

    assert!(world.admit(&campaign, wallet(1)).is_accepted());
    let reservation = world.drain_queue().pop().unwrap();
    let reference = reservation.reference.clone();
    assert_eq!(world.dispatcher.relay(reservation).await, RelayOutcome::Unknown);
    assert_eq!(world.admission.unresolved()[0].reservation, reference);

    let service = analytics(&world);
    let report = service.campaign_report(&campaign.id).unwrap();
    assert_eq!(report.confirmed_claims, 0);
    assert_eq!(report.lamports_distributed, 0);
    assert_eq!(report.remaining_budget, 3 * REWARD);
    assert!((report.claim_rate - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn test_window_and_merchant_filters() {
    let world = World::new(fast_dispatch());
    let campaign = world.campaign_with("weekly", 10, 3 * 86_400, 10 * REWARD);

    for n in 0..2 {
        assert!(world.admit(&campaign, wallet(n)).is_accepted());
        let reservation = world.log.find(&campaign.id, &wallet(n)).unwrap().reservation;
        world
            .admission
            .settle(
                &reservation,
                RelayResolution::Confirmed(TxRef(format!("tx{n}"))),
                1,
            )
            .unwrap();
        world.clock.advance(2 * 86_400);
    }

    let service = analytics(&world);
    let summary = service.summarize(&ClaimFilter::default());
    assert_eq!(summary.confirmed_claims, 2);
    assert_eq!(summary.claims_last_24h, 0);
    assert_eq!(summary.claims_last_7d, 2);
    assert_eq!(summary.active_campaigns, 0);
    assert_eq!(
        service.campaign_report(&campaign.id).unwrap().status,
        CampaignStatus::Expired
    );

    let since = service.summarize(&ClaimFilter::default().since(world.clock.now() - 3 * 86_400));
    assert_eq!(since.confirmed_claims, 1);

    let mine = service.summarize(&ClaimFilter::merchant(MERCHANT));
    assert_eq!(mine.total_campaigns, 1);
    let theirs = service.summarize(&ClaimFilter::merchant(WalletId([0x11; 32])));
    assert_eq!(theirs.total_campaigns, 0);
    assert_eq!(theirs.confirmed_claims, 0);

    assert_eq!(service.top_campaigns(5)[0].confirmed_claims, 2);
}
