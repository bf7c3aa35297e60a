//! # Ports Layer
//!
//! - **Outbound (Driven)**: `LedgerClient` for the external ledger

pub mod outbound;
