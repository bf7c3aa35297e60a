//! # Ports Layer
//!
//! - **Inbound (Driving)**: `AnalyticsApi` for dashboards
//! - **Outbound (Driven)**: `CampaignCatalog` and `ClaimHistory` read sources

pub mod inbound;
pub mod outbound;
