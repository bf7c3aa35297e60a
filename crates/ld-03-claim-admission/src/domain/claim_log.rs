//! # Claim Log
//!
//! Append-only record of every reservation and its relay outcome.
//!
//! The log has its own lock. Writers always hold the owning campaign's slot
//! lock first; readers (analytics, polling) take only the log lock.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::{CampaignId, ClaimRecord, RelayOutcome, ReservationRef, WalletId};

use super::errors::AdmissionError;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<ClaimRecord>,
    by_ref: HashMap<ReservationRef, usize>,
    by_claimant: HashMap<(CampaignId, WalletId), Vec<usize>>,
}

/// Shared claim log.
#[derive(Debug, Default)]
pub struct ClaimLog {
    inner: RwLock<Inner>,
}

impl ClaimLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record. References must be unique.
    pub fn append(&self, record: ClaimRecord) -> Result<(), AdmissionError> {
        let mut inner = self.inner.write();
        if inner.by_ref.contains_key(&record.reservation) {
            return Err(AdmissionError::DuplicateRecord(record.reservation));
        }
        let idx = inner.records.len();
        inner.by_ref.insert(record.reservation.clone(), idx);
        inner
            .by_claimant
            .entry((record.reservation.campaign_id.clone(), record.claimant))
            .or_default()
            .push(idx);
        inner.records.push(record);
        Ok(())
    }

    /// Mutate one record in place.
    pub fn update<R>(
        &self,
        reference: &ReservationRef,
        f: impl FnOnce(&mut ClaimRecord) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.write();
        let idx = *inner.by_ref.get(reference)?;
        inner.records.get_mut(idx).map(f)
    }

    pub fn get(&self, reference: &ReservationRef) -> Option<ClaimRecord> {
        let inner = self.inner.read();
        inner
            .by_ref
            .get(reference)
            .and_then(|&idx| inner.records.get(idx))
            .cloned()
    }

    /// Most recent record for a claimant in a campaign.
    pub fn find(&self, campaign: &CampaignId, claimant: &WalletId) -> Option<ClaimRecord> {
        let inner = self.inner.read();
        inner
            .by_claimant
            .get(&(campaign.clone(), *claimant))
            .and_then(|idxs| idxs.last())
            .and_then(|&idx| inner.records.get(idx))
            .cloned()
    }

    /// Every record with the given outcome, in reservation order.
    pub fn with_outcome(&self, outcome: RelayOutcome) -> Vec<ClaimRecord> {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| r.outcome == outcome)
            .cloned()
            .collect()
    }

    /// Full copy for read-side aggregation.
    pub fn snapshot(&self) -> Vec<ClaimRecord> {
        self.inner.read().records.clone()
    }

    pub fn count(&self, outcome: RelayOutcome) -> usize {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| r.outcome == outcome)
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}
