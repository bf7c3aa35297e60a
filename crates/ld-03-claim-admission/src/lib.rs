//! # Claim Admission Subsystem (LD-03)
//!
//! Decides, synchronously and in memory, whether a tap earns a reward slot.
//!
//! ## Algorithm
//!
//! ```text
//! ClaimRequest
//!     │
//!     ├─ 1. verify proof ──────────────────────────── BadProof
//!     ├─ 2. look up campaign ──────────────────────── NoSuchCampaign
//!     │     bind tag key, onchain id, freshness ───── BadProof
//!     │
//!     │  ┌──────────── campaign slot lock ─────────────┐
//!     ├─ │ 3. claimant already holds a slot? ── AlreadyClaimed
//!     ├─ │ 4. compare-and-reserve ──── Expired | NotActive | Exhausted
//!     │  │    issue sequence, add claimant,            │
//!     │  │    append ClaimRecord(Pending)              │
//!     │  └─────────────────────────────────────────────┘
//!     │
//!     └─ enqueue relay ─────────────────────────────── Accepted(ref)
//! ```
//!
//! Steps 3 and 4 share the campaign's lock, so concurrent requests for the
//! last slot or from the same claimant resolve first-committer-wins.
//!
//! ## Settlement
//!
//! Relay outcomes come back through [`ClaimAdmissionApi::settle`], which
//! takes the same campaign lock before the claim log lock. A definitive
//! rejection releases the slot and frees the claimant in the same step.
//!
//! ## Status Mapping
//!
//! | Decision | HTTP |
//! |----------|------|
//! | Accepted | 202 |
//! | BadProof | 400 |
//! | NoSuchCampaign | 404 |
//! | AlreadyClaimed | 409 |
//! | NotActive, Expired, Exhausted | 410 |

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::claim_log::ClaimLog;
pub use domain::entities::{
    ClaimDecision, ClaimRequest, RejectReason, RelayResolution, Reservation,
};
pub use domain::errors::AdmissionError;
pub use ports::inbound::ClaimAdmissionApi;
pub use ports::outbound::{RelayQueue, RelayQueueError};
pub use service::AdmissionService;
