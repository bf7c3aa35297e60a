//! # Error Types
//!
//! Errors shared by more than one subsystem.

use thiserror::Error;

/// Failure to parse a hex-encoded Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKeyError {
    /// Input is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded key has the wrong length.
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}
