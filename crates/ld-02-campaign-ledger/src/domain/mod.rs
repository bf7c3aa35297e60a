//! # Domain Layer
//!
//! Slot state machine and campaign validation. No I/O.

pub mod errors;
pub mod new_campaign;
pub mod slot;
