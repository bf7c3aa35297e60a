//! # Inbound Ports (Driving Ports / API)

use shared_types::CampaignId;

use crate::domain::entities::{AnalyticsSummary, CampaignRank, CampaignReport, ClaimFilter};
use crate::domain::errors::AnalyticsError;

/// Read-only analytics API.
pub trait AnalyticsApi: Send + Sync {
    /// Platform, merchant or campaign rollup, depending on `filter`.
    fn summarize(&self, filter: &ClaimFilter) -> AnalyticsSummary;

    /// Top `n` campaigns by confirmed-claim count.
    fn top_campaigns(&self, n: usize) -> Vec<CampaignRank>;

    /// # Errors
    /// - `CampaignNotFound`: no campaign with that id is cached
    fn campaign_report(&self, id: &CampaignId) -> Result<CampaignReport, AnalyticsError>;
}
