//! # Shared Types Crate
//!
//! Domain entities shared across the LootDrop subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Campaign` and `ClaimRecord` are defined once
//!   here and only mutated by the subsystem that owns them.
//! - **Opaque identifiers**: campaign ids are strings, wallets and tag keys are
//!   32-byte Ed25519 public keys rendered as hex.
//! - **Injectable time**: every time-dependent decision reads a `TimeSource`.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::*;
