//! # Admission Entities

use ld_01_proof_verification::ProofOfVisit;
use ld_02_campaign_ledger::ReserveRejection;
use serde::{Deserialize, Serialize};
use shared_types::{CampaignId, Lamports, ReservationRef, TxRef, WalletId};
use std::fmt;

/// A tap submitted for a specific campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub campaign_id: CampaignId,
    pub proof: ProofOfVisit,
}

/// Why a claim was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    BadProof,
    NoSuchCampaign,
    AlreadyClaimed,
    NotActive,
    Expired,
    Exhausted,
    /// The relay could not record the claim; nothing was reserved.
    Unavailable,
}

impl RejectReason {
    /// Status code a front end should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::BadProof => 400,
            Self::NoSuchCampaign => 404,
            Self::AlreadyClaimed => 409,
            Self::NotActive | Self::Expired | Self::Exhausted => 410,
            Self::Unavailable => 503,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadProof => "bad_proof",
            Self::NoSuchCampaign => "no_such_campaign",
            Self::AlreadyClaimed => "already_claimed",
            Self::NotActive => "not_active",
            Self::Expired => "expired",
            Self::Exhausted => "exhausted",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ReserveRejection> for RejectReason {
    fn from(r: ReserveRejection) -> Self {
        match r {
            ReserveRejection::NoSuchCampaign => Self::NoSuchCampaign,
            ReserveRejection::Expired => Self::Expired,
            ReserveRejection::NotActive => Self::NotActive,
            ReserveRejection::Exhausted => Self::Exhausted,
        }
    }
}

/// Outcome of `admit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum ClaimDecision {
    /// Slot reserved; the payout is relayed asynchronously.
    Accepted(ReservationRef),
    Rejected(RejectReason),
}

impl ClaimDecision {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Accepted(_) => 202,
            Self::Rejected(reason) => reason.http_status(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn reservation(&self) -> Option<&ReservationRef> {
        match self {
            Self::Accepted(r) => Some(r),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(r) => Some(*r),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::Rejected(r) => r.as_str(),
        }
    }
}

/// What the dispatcher needs to submit a payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub reference: ReservationRef,
    pub claimant: WalletId,
    pub amount: Lamports,
}

impl Reservation {
    pub fn campaign_id(&self) -> &CampaignId {
        &self.reference.campaign_id
    }
}

/// A relay result to apply to a claim record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayResolution {
    Confirmed(TxRef),
    /// Definitive ledger refusal; releases the reservation.
    Rejected(String),
    /// No definitive answer; the slot stays held for reconciliation.
    Unknown,
}

impl RelayResolution {
    pub fn outcome(&self) -> shared_types::RelayOutcome {
        use shared_types::RelayOutcome;
        match self {
            Self::Confirmed(_) => RelayOutcome::Confirmed,
            Self::Rejected(_) => RelayOutcome::Rejected,
            Self::Unknown => RelayOutcome::Unknown,
        }
    }
}
