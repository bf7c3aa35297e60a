//! # Ports Layer
//!
//! - **Inbound (Driving)**: `CampaignLedgerApi` for merchant and read paths
//! - **Outbound (Driven)**: `CampaignStore` backing storage

pub mod inbound;
pub mod outbound;
