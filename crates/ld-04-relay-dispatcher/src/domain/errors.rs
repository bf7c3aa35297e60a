//! # Relay Errors

use thiserror::Error;

/// Transient ledger client failures. All are retried.
///
/// Definitive refusals are not errors; they arrive as
/// `LedgerResponse::Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerClientError {
    #[error("Ledger request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Ledger congested: {0}")]
    Congested(String),
}

impl LedgerClientError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Congested(_) => "congested",
        }
    }
}
