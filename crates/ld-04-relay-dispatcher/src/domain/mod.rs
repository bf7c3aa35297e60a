//! # Domain Layer

pub mod entities;
pub mod errors;
pub mod retry;
