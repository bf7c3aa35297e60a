//! # Analytics Entities

use serde::{Deserialize, Serialize};
use shared_types::{CampaignId, CampaignStatus, Lamports, Timestamp, WalletId};

/// Which campaigns and claims a rollup covers. Empty filter = whole platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFilter {
    /// Only campaigns owned by this merchant.
    #[serde(default)]
    pub merchant: Option<WalletId>,
    /// Only this campaign.
    #[serde(default)]
    pub campaign: Option<CampaignId>,
    /// Only claims admitted at or after this instant.
    #[serde(default)]
    pub since: Option<Timestamp>,
}

impl ClaimFilter {
    pub fn merchant(merchant: WalletId) -> Self {
        Self {
            merchant: Some(merchant),
            ..Self::default()
        }
    }

    pub fn campaign(campaign: CampaignId) -> Self {
        Self {
            campaign: Some(campaign),
            ..Self::default()
        }
    }

    pub fn since(mut self, since: Timestamp) -> Self {
        self.since = Some(since);
        self
    }
}

/// One row of the top-campaigns table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRank {
    pub campaign_id: CampaignId,
    pub name: String,
    pub confirmed_claims: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_campaigns: u64,
    pub active_campaigns: u64,
    pub confirmed_claims: u64,
    pub lamports_distributed: Lamports,
    pub unique_claimers: u64,
    pub claims_last_24h: u64,
    pub claims_last_7d: u64,
    pub top_campaigns: Vec<CampaignRank>,
}

/// Detailed view of a single campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign_id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub confirmed_claims: u64,
    pub unique_claimers: u64,
    pub lamports_distributed: Lamports,
    /// `reward_per_claim * (max_claims - claims_reserved)`.
    pub remaining_budget: Lamports,
    /// `claims_reserved / max_claims`, in `[0, 1]`.
    pub claim_rate: f64,
}
