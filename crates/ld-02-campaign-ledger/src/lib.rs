//! # Campaign Ledger Subsystem (LD-02)
//!
//! Authoritative in-memory view of every campaign's budget and lifecycle.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────────────────────┐
//!  admission ──→ │ CampaignLedger                           │
//!                │  RwLock<HashMap<CampaignId, Arc<Mutex<   │
//!                │      CampaignSlot { campaign,            │
//!                │                     claimants,           │
//!                │                     next_sequence }>>>>  │
//!                └──────────────┬───────────────────────────┘
//!                               │ persist (after unlock, versioned)
//!                               ▼
//!                        CampaignStore port
//! ```
//!
//! Each campaign has its own mutex, so contention on one campaign never
//! blocks another. The map lock is held only long enough to clone the slot
//! handle.
//!
//! ## compare-and-reserve
//!
//! | Step | Condition | Result |
//! |------|-----------|--------|
//! | a | resolve slot | |
//! | b | unknown id | `NoSuchCampaign` |
//! | c | `now >= expiry` | `Expired` (Active becomes Expired) |
//! | d | status != Active | `NotActive` |
//! | e | reserved >= max | `Exhausted` |
//! | f | increment | `Reserved(n)`; at `n == max` status becomes Closed |
//!
//! ## Write-through
//!
//! The cache is authoritative. Mutations bump `Campaign::version` and the
//! resulting snapshot is written to the store once the slot lock is
//! released. Stores drop snapshots older than the one they hold, and a
//! store failure is logged without undoing the in-memory decision.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory_store::InMemoryCampaignStore;
pub use domain::errors::{LedgerError, ReserveRejection, ValidationError};
pub use domain::new_campaign::{
    NewCampaign, MAX_CLAIMS_LIMIT, MAX_NAME_LEN, MAX_RADIUS_METERS, MAX_URI_LEN, MIN_RADIUS_METERS,
};
pub use domain::slot::{CampaignSlot, SlotSnapshot};
pub use ports::inbound::CampaignLedgerApi;
pub use ports::outbound::{CampaignStore, StoreError};
pub use service::CampaignLedger;
