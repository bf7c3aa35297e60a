//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `WalletId`, `TagPublicKey`, `CampaignId`, `ReservationRef`
//! - **Campaign**: `Campaign`, `CampaignStatus`, `CloseReason`, `Geofence`
//! - **Claims**: `ClaimRecord`, `RelayOutcome`, `TxRef`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::errors::ParseKeyError;

/// Amount in the ledger's smallest currency unit.
pub type Lamports = u64;

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// Size of an Ed25519 public key in bytes.
pub const PUBKEY_SIZE: usize = 32;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

macro_rules! ed25519_key_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; PUBKEY_SIZE]);

        impl $name {
            /// Wrap raw key bytes.
            pub const fn from_bytes(bytes: [u8; PUBKEY_SIZE]) -> Self {
                Self(bytes)
            }

            /// Raw key bytes.
            pub fn as_bytes(&self) -> &[u8; PUBKEY_SIZE] {
                &self.0
            }

            /// Parse a 64-character hex string.
            pub fn from_hex(s: &str) -> Result<Self, ParseKeyError> {
                let bytes = hex::decode(s).map_err(|e| ParseKeyError::InvalidHex(e.to_string()))?;
                let bytes: [u8; PUBKEY_SIZE] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| ParseKeyError::InvalidLength {
                        expected: PUBKEY_SIZE,
                        got: bytes.len(),
                    })?;
                Ok(Self(bytes))
            }

            /// Full lowercase hex encoding.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", stringify!($name), &self.to_hex()[..8])
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

ed25519_key_type!(
    /// A claimant or merchant wallet (Ed25519 public key).
    WalletId
);

ed25519_key_type!(
    /// The public key of a provisioned tag. Proofs of visit are signed by the
    /// tag's secret key, which never leaves its secure element.
    TagPublicKey
);

/// Opaque unique campaign identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(String);

impl CampaignId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reference to a single reservation.
///
/// Sequence numbers are issued per campaign and never reused, even when a
/// reservation is released, so the pair is unique for the life of the
/// campaign. The ledger uses it as the idempotency key for payouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationRef {
    pub campaign_id: CampaignId,
    pub sequence: u64,
}

impl ReservationRef {
    pub fn new(campaign_id: CampaignId, sequence: u64) -> Self {
        Self {
            campaign_id,
            sequence,
        }
    }
}

impl fmt::Display for ReservationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.campaign_id, self.sequence)
    }
}

// =============================================================================
// CLUSTER B: CAMPAIGN
// =============================================================================

/// Geographic area in which the campaign's tag is installed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
}

/// Campaign lifecycle status.
///
/// ```text
/// [Active] ──pause──→ [Paused] ──resume──→ [Active]
///    │                    │
///    ├── now >= expiry ──→ [Expired]          (terminal)
///    └── budget / merchant ──→ [Closed] ←── merchant
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Expired,
    Closed,
}

impl CampaignStatus {
    /// Expired and Closed accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Closed)
    }

    /// Whether `self -> next` is an allowed lifecycle edge.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Active, Paused) | (Active, Expired) | (Active, Closed) | (Paused, Active) | (Paused, Closed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Expired => "expired",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a campaign is Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Every slot was reserved.
    Exhausted,
    /// The owning merchant closed it.
    Merchant,
}

/// A merchant-funded pool of identical rewards bound to one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    /// Campaign number used by the on-chain program; proof payloads carry it.
    pub onchain_id: u64,
    pub name: String,
    pub merchant: WalletId,
    pub reward_per_claim: Lamports,
    pub max_claims: u32,
    /// Invariant: `claims_reserved <= max_claims`.
    pub claims_reserved: u32,
    pub expiry_ts: Timestamp,
    pub status: CampaignStatus,
    /// Present exactly when `status == Closed`.
    pub close_reason: Option<CloseReason>,
    pub tag_pubkey: TagPublicKey,
    pub geofence: Geofence,
    pub metadata_uri: String,
    pub created_at: Timestamp,
    /// Bumped on every mutation; stores drop snapshots older than what they hold.
    pub version: u64,
}

impl Campaign {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expiry_ts
    }

    pub fn remaining_claims(&self) -> u32 {
        self.max_claims.saturating_sub(self.claims_reserved)
    }

    /// Lamports still reserved for future claims.
    pub fn remaining_budget(&self) -> Lamports {
        self.reward_per_claim
            .saturating_mul(u64::from(self.remaining_claims()))
    }

    /// Status as a reader would see it right now.
    ///
    /// Admission applies expiry lazily; display paths call this so an expired
    /// campaign does not look Active just because nobody tapped it since.
    pub fn effective_status(&self, now: Timestamp) -> CampaignStatus {
        if self.status == CampaignStatus::Active && self.is_expired_at(now) {
            CampaignStatus::Expired
        } else {
            self.status
        }
    }
}

// =============================================================================
// CLUSTER C: CLAIMS
// =============================================================================

/// Ledger transaction reference (signature) of a confirmed payout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxRef(pub String);

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relay outcome of a claim record.
///
/// ```text
/// [Pending] ──→ [Confirmed]
///     │    ──→ [Rejected]
///     └──────→ [Unknown] ──reconcile──→ [Confirmed] | [Rejected]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayOutcome {
    Pending,
    Confirmed,
    Rejected,
    Unknown,
}

impl RelayOutcome {
    /// Whether the record still holds a budget slot and uniqueness entry.
    pub fn holds_slot(self) -> bool {
        !matches!(self, Self::Rejected)
    }

    pub fn is_final(self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected)
    }

    pub fn can_transition_to(self, next: RelayOutcome) -> bool {
        use RelayOutcome::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Rejected)
                | (Pending, Unknown)
                | (Unknown, Confirmed)
                | (Unknown, Rejected)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reservation and its relay history. Append-only; never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub reservation: ReservationRef,
    pub claimant: WalletId,
    pub amount: Lamports,
    pub outcome: RelayOutcome,
    /// Present once Confirmed.
    pub tx_ref: Option<TxRef>,
    pub rejection_reason: Option<String>,
    pub relay_attempts: u32,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl ClaimRecord {
    /// A fresh Pending record.
    pub fn pending(
        reservation: ReservationRef,
        claimant: WalletId,
        amount: Lamports,
        created_at: Timestamp,
    ) -> Self {
        Self {
            reservation,
            claimant,
            amount,
            outcome: RelayOutcome::Pending,
            tx_ref: None,
            rejection_reason: None,
            relay_attempts: 0,
            created_at,
            resolved_at: None,
        }
    }

    pub fn campaign_id(&self) -> &CampaignId {
        &self.reservation.campaign_id
    }

    pub fn sequence(&self) -> u64 {
        self.reservation.sequence
    }
}
