//! In-memory `CampaignStore` with version-guarded writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use shared_types::CampaignId;
use tracing::trace;

use crate::domain::slot::SlotSnapshot;
use crate::ports::outbound::{CampaignStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryCampaignStore {
    slots: RwLock<HashMap<CampaignId, SlotSnapshot>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, for exercising the write-through error path.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Accepted writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}

impl CampaignStore for InMemoryCampaignStore {
    fn load(&self, id: &CampaignId) -> Result<Option<SlotSnapshot>, StoreError> {
        Ok(self.slots.read().get(id).cloned())
    }

    fn persist(&self, snapshot: &SlotSnapshot) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        let mut slots = self.slots.write();
        let id = &snapshot.campaign.id;
        if let Some(existing) = slots.get(id) {
            if existing.version() >= snapshot.version() {
                trace!(campaign_id = %id, stored = existing.version(), offered = snapshot.version(), "[ld-02] stale snapshot dropped");
                return Ok(());
            }
        }
        slots.insert(id.clone(), snapshot.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<SlotSnapshot>, StoreError> {
        Ok(self.slots.read().values().cloned().collect())
    }
}
