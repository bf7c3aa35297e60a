//! # Relay Entities

use shared_types::TxRef;

/// Definitive answer to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerResponse {
    Confirmed(TxRef),
    /// Malformed instruction, insufficient escrow, closed campaign account.
    Rejected(String),
}

/// What the ledger knows about a reservation reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerStatus {
    Confirmed(TxRef),
    Rejected(String),
    /// Never received; safe to resubmit.
    NotFound,
}

/// Result of a shutdown drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Relays that reached an outcome before the deadline.
    pub completed: usize,
    /// Relays cut off at the deadline and marked Unknown.
    pub abandoned: usize,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub examined: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub resubmitted: usize,
    /// Still Unknown after this pass.
    pub unresolved: usize,
}
