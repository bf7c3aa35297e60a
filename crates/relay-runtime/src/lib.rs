//! # Relay Runtime Library
//!
//! Engine lifecycle for the LootDrop relay. The `main.rs` binary is a thin
//! wrapper; tests drive [`LootDropEngine`] directly.

pub mod config;
pub mod engine;

pub use config::{CampaignSeed, ConfigError, RuntimeConfig};
pub use engine::LootDropEngine;
