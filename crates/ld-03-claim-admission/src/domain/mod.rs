//! # Domain Layer

pub mod claim_log;
pub mod entities;
pub mod errors;
