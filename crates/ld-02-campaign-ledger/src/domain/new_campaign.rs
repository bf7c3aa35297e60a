//! # Campaign Creation
//!
//! Bounds mirror what the on-chain program enforces at creation.

use serde::{Deserialize, Serialize};
use shared_types::{
    Campaign, CampaignId, CampaignStatus, Geofence, Lamports, TagPublicKey, Timestamp, WalletId,
};

use super::errors::ValidationError;

pub const MAX_CLAIMS_LIMIT: u32 = 1_000_000;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_URI_LEN: usize = 200;
pub const MIN_RADIUS_METERS: u32 = 10;
pub const MAX_RADIUS_METERS: u32 = 5_000;

/// Merchant request to create a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub id: CampaignId,
    pub onchain_id: u64,
    pub name: String,
    pub merchant: WalletId,
    pub reward_per_claim: Lamports,
    pub max_claims: u32,
    pub expiry_ts: Timestamp,
    pub tag_pubkey: TagPublicKey,
    pub geofence: Geofence,
    #[serde(default)]
    pub metadata_uri: String,
}

impl NewCampaign {
    /// Total lamports the merchant must escrow, if it fits in u64.
    pub fn escrow_required(&self) -> Option<Lamports> {
        self.reward_per_claim
            .checked_mul(u64::from(self.max_claims))
    }

    pub fn validate(&self, now: Timestamp) -> Result<(), ValidationError> {
        if self.id.as_str().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.expiry_ts <= now {
            return Err(ValidationError::ExpiryNotInFuture {
                expiry_ts: self.expiry_ts,
                now,
            });
        }
        if self.reward_per_claim == 0 {
            return Err(ValidationError::ZeroReward);
        }
        if self.max_claims == 0 || self.max_claims > MAX_CLAIMS_LIMIT {
            return Err(ValidationError::MaxClaimsOutOfRange(self.max_claims));
        }
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(ValidationError::NameLength(name_len));
        }
        let uri_len = self.metadata_uri.chars().count();
        if uri_len > MAX_URI_LEN {
            return Err(ValidationError::UriTooLong(uri_len));
        }
        let fence = &self.geofence;
        if !(-90.0..=90.0).contains(&fence.latitude) {
            return Err(ValidationError::Latitude(fence.latitude));
        }
        if !(-180.0..=180.0).contains(&fence.longitude) {
            return Err(ValidationError::Longitude(fence.longitude));
        }
        if !(MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(&fence.radius_meters) {
            return Err(ValidationError::Radius(fence.radius_meters));
        }
        if self.escrow_required().is_none() {
            return Err(ValidationError::EscrowOverflow);
        }
        Ok(())
    }

    /// Validate and build an Active campaign with nothing reserved.
    pub fn into_campaign(self, now: Timestamp) -> Result<Campaign, ValidationError> {
        self.validate(now)?;
        Ok(Campaign {
            id: self.id,
            onchain_id: self.onchain_id,
            name: self.name,
            merchant: self.merchant,
            reward_per_claim: self.reward_per_claim,
            max_claims: self.max_claims,
            claims_reserved: 0,
            expiry_ts: self.expiry_ts,
            status: CampaignStatus::Active,
            close_reason: None,
            tag_pubkey: self.tag_pubkey,
            geofence: self.geofence,
            metadata_uri: self.metadata_uri,
            created_at: now,
            version: 1,
        })
    }
}
