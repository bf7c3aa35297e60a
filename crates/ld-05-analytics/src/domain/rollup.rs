//! # Rollups
//!
//! Pure folds over campaign and claim snapshots.

use std::collections::{HashMap, HashSet};

use shared_types::{
    Campaign, CampaignId, CampaignStatus, ClaimRecord, Lamports, RelayOutcome, Timestamp,
};

use super::entities::{AnalyticsSummary, CampaignRank, CampaignReport, ClaimFilter};

pub const DAY_SECS: i64 = 86_400;
pub const WEEK_SECS: i64 = 7 * DAY_SECS;

/// Length of the top-campaigns table in a summary.
pub const DEFAULT_TOP_N: usize = 5;

fn campaign_matches(campaign: &Campaign, filter: &ClaimFilter) -> bool {
    filter.merchant.map_or(true, |m| campaign.merchant == m)
        && filter.campaign.as_ref().map_or(true, |id| &campaign.id == id)
}

fn confirmed_in<'a>(
    records: &'a [ClaimRecord],
    scope: &'a HashSet<&'a CampaignId>,
    since: Option<Timestamp>,
) -> impl Iterator<Item = &'a ClaimRecord> + 'a {
    records.iter().filter(move |r| {
        r.outcome == RelayOutcome::Confirmed
            && scope.contains(r.campaign_id())
            && since.map_or(true, |s| r.created_at >= s)
    })
}

fn rank<'a>(
    campaigns: impl IntoIterator<Item = &'a Campaign>,
    confirmed: impl IntoIterator<Item = &'a ClaimRecord>,
    n: usize,
) -> Vec<CampaignRank> {
    let mut counts: HashMap<&CampaignId, u64> = HashMap::new();
    for record in confirmed {
        *counts.entry(record.campaign_id()).or_default() += 1;
    }

    let mut ranks: Vec<CampaignRank> = campaigns
        .into_iter()
        .filter_map(|c| {
            counts.get(&c.id).map(|&confirmed_claims| CampaignRank {
                campaign_id: c.id.clone(),
                name: c.name.clone(),
                confirmed_claims,
            })
        })
        .collect();
    ranks.sort_by(|a, b| {
        b.confirmed_claims
            .cmp(&a.confirmed_claims)
            .then_with(|| a.campaign_id.cmp(&b.campaign_id))
    });
    ranks.truncate(n);
    ranks
}

/// Roll up confirmed claims for the campaigns selected by `filter`.
pub fn summarize(
    campaigns: &[Campaign],
    records: &[ClaimRecord],
    filter: &ClaimFilter,
    now: Timestamp,
) -> AnalyticsSummary {
    let selected: Vec<&Campaign> = campaigns
        .iter()
        .filter(|c| campaign_matches(c, filter))
        .collect();
    let scope: HashSet<&CampaignId> = selected.iter().copied().map(|c| &c.id).collect();

    let mut summary = AnalyticsSummary {
        total_campaigns: selected.len() as u64,
        active_campaigns: selected
            .iter()
            .filter(|c| c.effective_status(now) == CampaignStatus::Active)
            .count() as u64,
        ..AnalyticsSummary::default()
    };

    let mut claimers = HashSet::new();
    let mut counted: Vec<&ClaimRecord> = Vec::new();
    for record in confirmed_in(records, &scope, filter.since) {
        summary.confirmed_claims += 1;
        summary.lamports_distributed = summary.lamports_distributed.saturating_add(record.amount);
        claimers.insert(record.claimant);

        let age = now - record.created_at;
        if age < DAY_SECS {
            summary.claims_last_24h += 1;
        }
        if age < WEEK_SECS {
            summary.claims_last_7d += 1;
        }
        counted.push(record);
    }
    summary.unique_claimers = claimers.len() as u64;

    summary.top_campaigns = rank(selected, counted, DEFAULT_TOP_N);
    summary
}

/// Campaigns ordered by confirmed-claim count, most first; ties by id.
///
/// Campaigns with no confirmed claims are left out.
pub fn top_n(campaigns: &[Campaign], records: &[ClaimRecord], n: usize) -> Vec<CampaignRank> {
    rank(
        campaigns,
        records.iter().filter(|r| r.outcome == RelayOutcome::Confirmed),
        n,
    )
}

pub fn campaign_report(campaign: &Campaign, records: &[ClaimRecord], now: Timestamp) -> CampaignReport {
    let mut confirmed_claims = 0u64;
    let mut distributed: Lamports = 0;
    let mut claimers = HashSet::new();
    for record in records
        .iter()
        .filter(|r| r.outcome == RelayOutcome::Confirmed && r.campaign_id() == &campaign.id)
    {
        confirmed_claims += 1;
        distributed = distributed.saturating_add(record.amount);
        claimers.insert(record.claimant);
    }

    let claim_rate = if campaign.max_claims == 0 {
        0.0
    } else {
        f64::from(campaign.claims_reserved) / f64::from(campaign.max_claims)
    };

    CampaignReport {
        campaign_id: campaign.id.clone(),
        name: campaign.name.clone(),
        status: campaign.effective_status(now),
        confirmed_claims,
        unique_claimers: claimers.len() as u64,
        lamports_distributed: distributed,
        remaining_budget: campaign.remaining_budget(),
        claim_rate,
    }
}
