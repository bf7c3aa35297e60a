//! # Inbound Ports (Driving Ports / API)

use shared_types::{Campaign, CampaignId, WalletId};

use crate::domain::errors::{LedgerError, ReserveRejection};
use crate::domain::new_campaign::NewCampaign;

/// Campaign ledger API for merchant operations and read paths.
///
/// Claim admission uses [`crate::CampaignLedger::with_slot`] directly so it
/// can run its uniqueness check and record creation under the same lock.
///
/// # Example
///
/// ```rust,ignore
/// let campaign = ledger.register(request)?;
/// ledger.pause(&campaign.id, &merchant)?;
/// ledger.resume(&campaign.id, &merchant)?;
/// ```
pub trait CampaignLedgerApi: Send + Sync {
    /// Validate, cache and persist a new campaign.
    ///
    /// # Errors
    /// - `Invalid`: creation bounds violated
    /// - `AlreadyExists`: id already in the cache or the store
    fn register(&self, request: NewCampaign) -> Result<Campaign, LedgerError>;

    /// Snapshot of one campaign, hydrating from the store on a cache miss.
    fn get(&self, id: &CampaignId) -> Result<Campaign, LedgerError>;

    /// Atomically take one slot of an Active campaign.
    fn compare_and_reserve(&self, id: &CampaignId) -> Result<u32, ReserveRejection>;

    /// Roll back the reservation held by `claimant`. Returns whether one existed.
    fn release(&self, id: &CampaignId, claimant: &WalletId) -> Result<bool, LedgerError>;

    /// Merchant close. Owner only.
    fn close(&self, id: &CampaignId, merchant: &WalletId) -> Result<Campaign, LedgerError>;

    /// Active -> Paused. Owner only.
    fn pause(&self, id: &CampaignId, merchant: &WalletId) -> Result<Campaign, LedgerError>;

    /// Paused -> Active. Owner only.
    fn resume(&self, id: &CampaignId, merchant: &WalletId) -> Result<Campaign, LedgerError>;

    /// Snapshots of every cached campaign, ordered by id.
    fn list(&self) -> Vec<Campaign>;
}
