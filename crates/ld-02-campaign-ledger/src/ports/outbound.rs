//! # Outbound Ports (Driven Ports)
//!
//! Backing storage for campaign slots.

use shared_types::CampaignId;
use thiserror::Error;

use crate::domain::slot::SlotSnapshot;

/// Campaign store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record for campaign {0}")]
    Corrupt(CampaignId),
}

/// Durable store behind the ledger cache.
///
/// The ledger persists after releasing the slot lock, so snapshots can arrive
/// out of order. Implementations must keep the highest `version` they have
/// seen and ignore older ones.
pub trait CampaignStore: Send + Sync {
    /// Load one slot. `Ok(None)` when the campaign does not exist.
    fn load(&self, id: &CampaignId) -> Result<Option<SlotSnapshot>, StoreError>;

    /// Persist a snapshot, ignoring it if an equal or newer version is stored.
    fn persist(&self, snapshot: &SlotSnapshot) -> Result<(), StoreError>;

    /// Every stored slot, for warm start.
    fn load_all(&self) -> Result<Vec<SlotSnapshot>, StoreError>;
}
