//! # Analytics Subsystem (LD-05)
//!
//! Read-only rollups over confirmed claims.
//!
//! Nothing here mutates campaign or claim state. The aggregator reads a
//! snapshot of the campaign cache and the claim log, filters it, and folds
//! it into:
//!
//! - [`AnalyticsSummary`]: platform or merchant totals with 24 h / 7 d windows
//! - [`CampaignRank`]: top campaigns by confirmed-claim count
//! - [`CampaignReport`]: per-campaign distribution, remaining budget and claim rate
//!
//! Only `Confirmed` records count as distributed. Pending and Unknown claims
//! still hold budget, so they show up in the claim rate but not in totals.
//!
//! Campaign status in every view is the effective status: an Active campaign
//! past its expiry is reported as Expired even if nobody tapped it since.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{AnalyticsSummary, CampaignRank, CampaignReport, ClaimFilter};
pub use domain::errors::AnalyticsError;
pub use domain::rollup::{campaign_report, summarize, top_n, DEFAULT_TOP_N};
pub use ports::inbound::AnalyticsApi;
pub use ports::outbound::{CampaignCatalog, ClaimHistory};
pub use service::AnalyticsService;
