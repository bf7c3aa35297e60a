//! # Admission Errors

use ld_02_campaign_ledger::LedgerError;
use shared_types::{RelayOutcome, ReservationRef};
use thiserror::Error;

/// Errors from settling claim records.
///
/// Admission itself never errors; every failure there is a `ClaimDecision`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdmissionError {
    #[error("No claim record for reservation {0}")]
    UnknownReservation(ReservationRef),

    #[error("Reservation {reference}: cannot move {from} -> {to}")]
    InvalidTransition {
        reference: ReservationRef,
        from: RelayOutcome,
        to: RelayOutcome,
    },

    #[error("Duplicate claim record for reservation {0}")]
    DuplicateRecord(ReservationRef),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
