//! # LootDrop Test Suite
//!
//! Cross-subsystem flows that no single crate can exercise on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # World: ledger, admission, dispatcher, simulated chain
//!     ├── admission.rs      # Budget, uniqueness and expiry under concurrency
//!     ├── relay.rs          # Admission → dispatcher → ledger → settlement
//!     ├── lifecycle.rs      # Engine start, seed, shutdown drain
//!     └── analytics.rs      # Rollups over relayed claims
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lootdrop-tests
//! cargo test -p lootdrop-tests integration::relay::
//! ```
