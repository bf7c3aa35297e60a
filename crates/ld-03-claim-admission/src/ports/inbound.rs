//! # Inbound Ports (Driving Ports / API)

use shared_types::{CampaignId, ClaimRecord, ReservationRef, WalletId};

use crate::domain::entities::{ClaimDecision, ClaimRequest, RelayResolution};
use crate::domain::errors::AdmissionError;

/// Claim admission API.
///
/// `admit` is called by front ends; `settle` and `unresolved` by the relay
/// dispatcher and reconciliation job; `record` and `find` by pollers.
pub trait ClaimAdmissionApi: Send + Sync {
    /// Decide a claim. Never blocks on I/O and never errors; every failure
    /// is a `Rejected` decision.
    fn admit(&self, request: &ClaimRequest) -> ClaimDecision;

    /// Apply a relay resolution to a claim record.
    ///
    /// `attempts` is added to the record's relay attempt count. Settling an
    /// Unknown record as Unknown again only adds the attempts.
    ///
    /// # Errors
    /// - `UnknownReservation`: no such record
    /// - `InvalidTransition`: the record's outcome does not allow it
    fn settle(
        &self,
        reference: &ReservationRef,
        resolution: RelayResolution,
        attempts: u32,
    ) -> Result<ClaimRecord, AdmissionError>;

    /// Records in Unknown, awaiting reconciliation.
    fn unresolved(&self) -> Vec<ClaimRecord>;

    fn record(&self, reference: &ReservationRef) -> Option<ClaimRecord>;

    /// Latest record for a claimant in a campaign.
    fn find(&self, campaign: &CampaignId, claimant: &WalletId) -> Option<ClaimRecord>;
}
