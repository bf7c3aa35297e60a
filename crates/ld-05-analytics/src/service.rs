//! # Analytics Service

use std::sync::Arc;

use shared_types::{CampaignId, TimeSource};
use tracing::debug;

use crate::domain::entities::{AnalyticsSummary, CampaignRank, CampaignReport, ClaimFilter};
use crate::domain::errors::AnalyticsError;
use crate::domain::rollup;
use crate::ports::inbound::AnalyticsApi;
use crate::ports::outbound::{CampaignCatalog, ClaimHistory};

pub struct AnalyticsService {
    campaigns: Arc<dyn CampaignCatalog>,
    claims: Arc<dyn ClaimHistory>,
    clock: Arc<dyn TimeSource>,
}

impl AnalyticsService {
    pub fn new(
        campaigns: Arc<dyn CampaignCatalog>,
        claims: Arc<dyn ClaimHistory>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            campaigns,
            claims,
            clock,
        }
    }
}

impl AnalyticsApi for AnalyticsService {
    fn summarize(&self, filter: &ClaimFilter) -> AnalyticsSummary {
        let campaigns = self.campaigns.campaigns();
        let records = self.claims.claims();
        let summary = rollup::summarize(&campaigns, &records, filter, self.clock.now());
        debug!(
            campaigns = summary.total_campaigns,
            confirmed = summary.confirmed_claims,
            "[ld-05] summary computed"
        );
        summary
    }

    fn top_campaigns(&self, n: usize) -> Vec<CampaignRank> {
        rollup::top_n(&self.campaigns.campaigns(), &self.claims.claims(), n)
    }

    fn campaign_report(&self, id: &CampaignId) -> Result<CampaignReport, AnalyticsError> {
        let campaign = self
            .campaigns
            .campaigns()
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| AnalyticsError::CampaignNotFound(id.clone()))?;
        Ok(rollup::campaign_report(
            &campaign,
            &self.claims.claims(),
            self.clock.now(),
        ))
    }
}
