//! # Adapters Layer

pub mod sources;
