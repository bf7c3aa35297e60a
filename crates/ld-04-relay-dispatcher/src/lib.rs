//! # Relay Dispatcher Subsystem (LD-04)
//!
//! Carries every accepted reservation to a definitive ledger outcome.
//!
//! ## Flow
//!
//! ```text
//!  admission ──enqueue──→ mpsc ──→ RelayDispatcher::run
//!                                      │ spawn (JoinSet, Semaphore)
//!                                      ▼
//!                          submit ─ timeout ─ backoff ─ ... ─ ceiling
//!                              │            │                  │
//!                          Confirmed     Rejected           Unknown
//!                              │            │ release slot     │
//!                              └────────────┴──── settle ──────┘
//!                                                              │
//!                      Reconciler (every 30s) ←── unresolved ──┘
//!                          query_status: Confirmed | Rejected | NotFound → resubmit
//! ```
//!
//! ## Guarantees
//!
//! - Submission is keyed by `ReservationRef`; the ledger pays at most once
//!   per reference no matter how often it is resubmitted.
//! - Relays run on tasks owned by the dispatcher. The admitting caller
//!   going away never cancels one.
//! - On shutdown intake stops, in-flight relays get until the drain deadline,
//!   and whatever is still running is marked Unknown for reconciliation.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod reconciler;
pub mod service;

#[cfg(test)]
mod test_support;

pub use adapters::simulated_ledger::{LedgerFault, SimulatedLedger};
pub use domain::entities::{DrainReport, LedgerResponse, LedgerStatus, ReconcileReport};
pub use domain::errors::LedgerClientError;
pub use domain::retry::RetryPolicy;
pub use ports::outbound::LedgerClient;
pub use reconciler::Reconciler;
pub use service::{DispatcherConfig, RelayDispatcher, RelayHandle};
