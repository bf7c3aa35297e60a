//! # Domain Layer
//!
//! Pure proof logic with no I/O.

pub mod entities;
pub mod errors;
pub mod signer;
pub mod verifier;
