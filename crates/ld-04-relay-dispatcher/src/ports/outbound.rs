//! # Outbound Ports
//!
//! The external ledger (on-chain program) as seen by the relay.

use async_trait::async_trait;
use ld_03_claim_admission::Reservation;
use shared_types::ReservationRef;

use crate::domain::entities::{LedgerResponse, LedgerStatus};
use crate::domain::errors::LedgerClientError;

/// External ledger client - outbound port.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a payout. Must be idempotent per `reservation.reference`:
    /// resubmitting a confirmed reference returns the original transaction.
    async fn submit(&self, reservation: &Reservation) -> Result<LedgerResponse, LedgerClientError>;

    /// Look up a previously submitted reference.
    async fn query_status(&self, reference: &ReservationRef)
        -> Result<LedgerStatus, LedgerClientError>;
}
