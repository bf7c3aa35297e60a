//! # Campaign Ledger Service
//!
//! Owns the per-campaign slots and writes mutations through to the store.
//!
//! Lock order: map lock, then slot lock, then whatever the caller takes
//! inside [`CampaignLedger::with_slot`]. The map lock is never held while a
//! slot lock is taken.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use shared_types::{Campaign, CampaignId, TimeSource, Timestamp, WalletId};
use tracing::{debug, info, warn};

use crate::domain::errors::{LedgerError, ReserveRejection};
use crate::domain::new_campaign::NewCampaign;
use crate::domain::slot::{CampaignSlot, SlotSnapshot};
use crate::ports::inbound::CampaignLedgerApi;
use crate::ports::outbound::CampaignStore;

type SlotHandle = Arc<Mutex<CampaignSlot>>;

/// In-memory campaign cache, authoritative over the backing store.
pub struct CampaignLedger {
    slots: RwLock<HashMap<CampaignId, SlotHandle>>,
    store: Arc<dyn CampaignStore>,
    clock: Arc<dyn TimeSource>,
}

impl CampaignLedger {
    pub fn new(store: Arc<dyn CampaignStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            store,
            clock,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Load every stored slot into the cache. Returns how many were added.
    pub fn warm_start(&self) -> Result<usize, LedgerError> {
        let snapshots = self.store.load_all()?;
        let mut slots = self.slots.write();
        let mut added = 0;
        for snapshot in snapshots {
            if let Entry::Vacant(e) = slots.entry(snapshot.campaign.id.clone()) {
                e.insert(Arc::new(Mutex::new(CampaignSlot::from_snapshot(snapshot))));
                added += 1;
            }
        }
        info!(campaigns = added, "[ld-02] ledger warm start complete");
        Ok(added)
    }

    fn cached(&self, id: &CampaignId) -> Option<SlotHandle> {
        self.slots.read().get(id).cloned()
    }

    /// Resolve a slot, hydrating from the store on a miss.
    fn handle(&self, id: &CampaignId) -> Result<SlotHandle, LedgerError> {
        if let Some(handle) = self.cached(id) {
            return Ok(handle);
        }

        let snapshot = self
            .store
            .load(id)?
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;

        debug!(campaign_id = %id, version = snapshot.version(), "[ld-02] hydrated from store");
        let handle = self
            .slots
            .write()
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(CampaignSlot::from_snapshot(snapshot))))
            .clone();
        Ok(handle)
    }

    /// Run `f` with exclusive access to one campaign's slot.
    ///
    /// `f` receives the current time read once before the lock is taken. If
    /// `f` changed the campaign, the new snapshot is persisted after the lock
    /// is released. `f` must not block or perform I/O.
    pub fn with_slot<R>(
        &self,
        id: &CampaignId,
        f: impl FnOnce(&mut CampaignSlot, Timestamp) -> R,
    ) -> Result<R, LedgerError> {
        let handle = self.handle(id)?;
        let now = self.clock.now();

        let (result, changed) = {
            let mut slot = handle.lock();
            let before = slot.version();
            let result = f(&mut slot, now);
            let changed = (slot.version() != before).then(|| slot.snapshot());
            (result, changed)
        };

        if let Some(snapshot) = changed {
            self.write_through(&snapshot);
        }
        Ok(result)
    }

    fn write_through(&self, snapshot: &SlotSnapshot) {
        if let Err(e) = self.store.persist(snapshot) {
            warn!(
                campaign_id = %snapshot.campaign.id,
                version = snapshot.version(),
                error = %e,
                "[ld-02] write-through failed, cache remains authoritative"
            );
        }
    }

    fn merchant_action(
        &self,
        id: &CampaignId,
        action: &'static str,
        f: impl FnOnce(&mut CampaignSlot, Timestamp) -> Result<(), LedgerError>,
    ) -> Result<Campaign, LedgerError> {
        let campaign = self.with_slot(id, |slot, now| {
            f(slot, now)?;
            Ok::<_, LedgerError>(slot.campaign().clone())
        })??;
        info!(campaign_id = %id, status = %campaign.status, "[ld-02] campaign {}", action);
        Ok(campaign)
    }
}

impl CampaignLedgerApi for CampaignLedger {
    fn register(&self, request: NewCampaign) -> Result<Campaign, LedgerError> {
        let now = self.clock.now();
        let campaign = request.into_campaign(now)?;
        let id = campaign.id.clone();

        if self.store.load(&id)?.is_some() {
            return Err(LedgerError::AlreadyExists(id));
        }

        let slot = CampaignSlot::new(campaign.clone());
        let snapshot = slot.snapshot();
        match self.slots.write().entry(id.clone()) {
            Entry::Occupied(_) => return Err(LedgerError::AlreadyExists(id)),
            Entry::Vacant(e) => {
                e.insert(Arc::new(Mutex::new(slot)));
            }
        }
        self.write_through(&snapshot);

        info!(
            campaign_id = %id,
            onchain_id = campaign.onchain_id,
            merchant = %campaign.merchant,
            reward = campaign.reward_per_claim,
            max_claims = campaign.max_claims,
            "[ld-02] campaign registered"
        );
        Ok(campaign)
    }

    fn get(&self, id: &CampaignId) -> Result<Campaign, LedgerError> {
        let handle = self.handle(id)?;
        let campaign = handle.lock().campaign().clone();
        Ok(campaign)
    }

    fn compare_and_reserve(&self, id: &CampaignId) -> Result<u32, ReserveRejection> {
        match self.with_slot(id, |slot, now| slot.compare_and_reserve(now)) {
            Ok(result) => result,
            Err(LedgerError::NotFound(_)) => Err(ReserveRejection::NoSuchCampaign),
            Err(e) => {
                warn!(campaign_id = %id, error = %e, "[ld-02] reserve could not resolve campaign");
                Err(ReserveRejection::NoSuchCampaign)
            }
        }
    }

    fn release(&self, id: &CampaignId, claimant: &WalletId) -> Result<bool, LedgerError> {
        let released = self.with_slot(id, |slot, now| slot.release(claimant, now))?;
        if released {
            debug!(campaign_id = %id, claimant = %claimant, "[ld-02] reservation released");
        }
        Ok(released)
    }

    fn close(&self, id: &CampaignId, merchant: &WalletId) -> Result<Campaign, LedgerError> {
        self.merchant_action(id, "closed", |slot, now| slot.close(merchant, now))
    }

    fn pause(&self, id: &CampaignId, merchant: &WalletId) -> Result<Campaign, LedgerError> {
        self.merchant_action(id, "paused", |slot, now| slot.pause(merchant, now))
    }

    fn resume(&self, id: &CampaignId, merchant: &WalletId) -> Result<Campaign, LedgerError> {
        self.merchant_action(id, "resumed", |slot, now| slot.resume(merchant, now))
    }

    fn list(&self) -> Vec<Campaign> {
        let handles: Vec<SlotHandle> = self.slots.read().values().cloned().collect();
        let mut campaigns: Vec<Campaign> = handles
            .iter()
            .map(|h| h.lock().campaign().clone())
            .collect();
        campaigns.sort_by(|a, b| a.id.cmp(&b.id));
        campaigns
    }
}
