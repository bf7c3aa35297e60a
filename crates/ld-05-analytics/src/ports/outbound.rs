//! # Outbound Ports (Driven Ports / SPI)

use shared_types::{Campaign, ClaimRecord};

/// Source of campaign snapshots.
pub trait CampaignCatalog: Send + Sync {
    fn campaigns(&self) -> Vec<Campaign>;
}

/// Source of claim record snapshots.
pub trait ClaimHistory: Send + Sync {
    fn claims(&self) -> Vec<ClaimRecord>;
}
