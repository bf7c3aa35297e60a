//! # Ledger Errors

use shared_types::{CampaignId, CampaignStatus, WalletId};
use thiserror::Error;

use super::new_campaign::{MAX_CLAIMS_LIMIT, MAX_NAME_LEN, MAX_URI_LEN};
use crate::ports::outbound::StoreError;

/// Why compare-and-reserve refused a slot.
///
/// These pass through admission unchanged as rejection reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ReserveRejection {
    #[error("campaign not found")]
    NoSuchCampaign,

    #[error("campaign expired")]
    Expired,

    #[error("campaign not active")]
    NotActive,

    #[error("campaign budget exhausted")]
    Exhausted,
}

/// Campaign creation validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expiry {expiry_ts} is not after now ({now})")]
    ExpiryNotInFuture { expiry_ts: i64, now: i64 },

    #[error("reward per claim must be positive")]
    ZeroReward,

    #[error("max claims {0} outside 1..={}", MAX_CLAIMS_LIMIT)]
    MaxClaimsOutOfRange(u32),

    #[error("name length {0} outside 1..={}", MAX_NAME_LEN)]
    NameLength(usize),

    #[error("metadata uri length {0} exceeds {}", MAX_URI_LEN)]
    UriTooLong(usize),

    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),

    #[error("geofence radius {0}m outside [10, 5000]")]
    Radius(u32),

    #[error("escrow reward x max claims overflows")]
    EscrowOverflow,

    #[error("campaign id must not be empty")]
    EmptyId,
}

/// Errors from campaign ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Campaign not found: {0}")]
    NotFound(CampaignId),

    #[error("Campaign already exists: {0}")]
    AlreadyExists(CampaignId),

    #[error("Invalid campaign: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Wallet {caller} does not own campaign {campaign}")]
    Unauthorized {
        campaign: CampaignId,
        caller: WalletId,
    },

    #[error("Campaign expired: {0}")]
    Expired(CampaignId),

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition {
        from: CampaignStatus,
        to: CampaignStatus,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
