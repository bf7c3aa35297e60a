use shared_types::CampaignId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),
}
