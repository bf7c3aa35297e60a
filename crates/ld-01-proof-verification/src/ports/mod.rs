//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the admission engine calls

pub mod inbound;
