//! # Outbound Ports (Driven Ports)

use thiserror::Error;

use crate::domain::entities::Reservation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayQueueError {
    #[error("Relay queue closed")]
    Closed,
}

/// Hand-off from admission to the relay dispatcher.
///
/// `enqueue` must not block: it is called right after the campaign lock is
/// released, on the admitting caller's thread.
pub trait RelayQueue: Send + Sync {
    fn enqueue(&self, reservation: Reservation) -> Result<(), RelayQueueError>;
}
