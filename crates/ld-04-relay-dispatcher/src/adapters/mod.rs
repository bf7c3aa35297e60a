//! # Adapters

pub mod simulated_ledger;
