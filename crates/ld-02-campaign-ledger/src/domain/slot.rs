//! # Campaign Slot
//!
//! The state guarded by one campaign's mutex: the campaign itself, the set
//! of claimants currently holding a reservation, and the next reservation
//! sequence number.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared_types::{Campaign, CampaignStatus, CloseReason, Timestamp, WalletId};

use super::errors::{LedgerError, ReserveRejection};

/// Per-campaign locked state.
#[derive(Debug, Clone)]
pub struct CampaignSlot {
    campaign: Campaign,
    claimants: HashSet<WalletId>,
    next_sequence: u64,
}

/// Persistable form of a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub campaign: Campaign,
    pub claimants: Vec<WalletId>,
    pub next_sequence: u64,
}

impl SlotSnapshot {
    pub fn version(&self) -> u64 {
        self.campaign.version
    }
}

impl CampaignSlot {
    pub fn new(campaign: Campaign) -> Self {
        Self {
            campaign,
            claimants: HashSet::new(),
            next_sequence: 0,
        }
    }

    pub fn from_snapshot(snapshot: SlotSnapshot) -> Self {
        Self {
            campaign: snapshot.campaign,
            claimants: snapshot.claimants.into_iter().collect(),
            next_sequence: snapshot.next_sequence,
        }
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let mut claimants: Vec<WalletId> = self.claimants.iter().copied().collect();
        claimants.sort();
        SlotSnapshot {
            campaign: self.campaign.clone(),
            claimants,
            next_sequence: self.next_sequence,
        }
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn version(&self) -> u64 {
        self.campaign.version
    }

    /// Whether `claimant` currently holds a Pending, Confirmed or Unknown reservation.
    pub fn has_claimed(&self, claimant: &WalletId) -> bool {
        self.claimants.contains(claimant)
    }

    pub fn claimant_count(&self) -> usize {
        self.claimants.len()
    }

    /// Atomic compare-and-reserve against an expected status of Active.
    ///
    /// Returns the new reserved count.
    pub fn compare_and_reserve(&mut self, now: Timestamp) -> Result<u32, ReserveRejection> {
        let campaign = &mut self.campaign;

        if campaign.is_expired_at(now) {
            if campaign.status.can_transition_to(CampaignStatus::Expired) {
                campaign.status = CampaignStatus::Expired;
                campaign.version += 1;
            }
            return Err(ReserveRejection::Expired);
        }
        if campaign.status != CampaignStatus::Active {
            // A campaign closed by its own budget reports why it closed.
            if campaign.close_reason == Some(CloseReason::Exhausted) {
                return Err(ReserveRejection::Exhausted);
            }
            return Err(ReserveRejection::NotActive);
        }
        if campaign.claims_reserved >= campaign.max_claims {
            return Err(ReserveRejection::Exhausted);
        }

        campaign.claims_reserved += 1;
        if campaign.claims_reserved == campaign.max_claims {
            campaign.status = CampaignStatus::Closed;
            campaign.close_reason = Some(CloseReason::Exhausted);
        }
        campaign.version += 1;
        Ok(campaign.claims_reserved)
    }

    /// Record `claimant` as holding a reservation and issue its sequence number.
    pub fn admit_claimant(&mut self, claimant: WalletId) -> u64 {
        self.claimants.insert(claimant);
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    /// Roll back one reservation held by `claimant`.
    ///
    /// Returns false when the claimant holds nothing. A campaign closed only
    /// because it ran out of slots reopens if it has not expired.
    pub fn release(&mut self, claimant: &WalletId, now: Timestamp) -> bool {
        if !self.claimants.remove(claimant) {
            return false;
        }
        let campaign = &mut self.campaign;
        campaign.claims_reserved = campaign.claims_reserved.saturating_sub(1);
        if campaign.status == CampaignStatus::Closed
            && campaign.close_reason == Some(CloseReason::Exhausted)
            && !campaign.is_expired_at(now)
        {
            campaign.status = CampaignStatus::Active;
            campaign.close_reason = None;
        }
        campaign.version += 1;
        true
    }

    fn ensure_owner(&self, caller: &WalletId) -> Result<(), LedgerError> {
        if &self.campaign.merchant != caller {
            return Err(LedgerError::Unauthorized {
                campaign: self.campaign.id.clone(),
                caller: *caller,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: CampaignStatus) -> Result<(), LedgerError> {
        let from = self.campaign.status;
        if !from.can_transition_to(to) {
            return Err(LedgerError::InvalidTransition { from, to });
        }
        self.campaign.status = to;
        self.campaign.version += 1;
        Ok(())
    }

    /// Settle lazy expiry so merchant actions see the real status.
    fn apply_expiry(&mut self, now: Timestamp) {
        if self.campaign.is_expired_at(now)
            && self.campaign.status.can_transition_to(CampaignStatus::Expired)
        {
            self.campaign.status = CampaignStatus::Expired;
            self.campaign.version += 1;
        }
    }

    pub fn close(&mut self, caller: &WalletId, now: Timestamp) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.apply_expiry(now);
        self.transition(CampaignStatus::Closed)?;
        self.campaign.close_reason = Some(CloseReason::Merchant);
        Ok(())
    }

    pub fn pause(&mut self, caller: &WalletId, now: Timestamp) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.apply_expiry(now);
        self.transition(CampaignStatus::Paused)
    }

    pub fn resume(&mut self, caller: &WalletId, now: Timestamp) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.apply_expiry(now);
        // Paused campaigns keep their status past expiry.
        if self.campaign.status == CampaignStatus::Paused && self.campaign.is_expired_at(now) {
            return Err(LedgerError::Expired(self.campaign.id.clone()));
        }
        self.transition(CampaignStatus::Active)
    }
}
