//! # Ports Layer
//!
//! - **Inbound (Driving)**: `ClaimAdmissionApi` for front ends and the relay dispatcher
//! - **Outbound (Driven)**: `RelayQueue` hand-off to the dispatcher

pub mod inbound;
pub mod outbound;
