//! # Proof Errors

use thiserror::Error;

/// Errors from proof verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProofError {
    /// Signature is not exactly 64 bytes.
    #[error("Malformed signature: expected {expected} bytes, got {got}")]
    MalformedSignature { expected: usize, got: usize },

    /// Payload is not exactly 48 bytes.
    #[error("Malformed payload: expected {expected} bytes, got {got}")]
    MalformedPayload { expected: usize, got: usize },

    /// Tag key does not decode to a curve point.
    #[error("Invalid tag key: not a valid Ed25519 point")]
    InvalidTagKey,

    /// Signature does not match the reconstructed message under the tag key.
    #[error("Proof signature verification failed")]
    VerificationFailed,

    /// Tap timestamp lies outside the freshness window.
    #[error("Stale proof: tapped at {tapped_at}, now {now}, max skew {max_skew}s")]
    Stale {
        tapped_at: i64,
        now: i64,
        max_skew: i64,
    },
}

impl ProofError {
    /// Input could not be parsed, as opposed to failing cryptographically.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedSignature { .. } | Self::MalformedPayload { .. } | Self::InvalidTagKey
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedSignature { .. } => "malformed_signature",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::InvalidTagKey => "invalid_tag_key",
            Self::VerificationFailed => "verification_failed",
            Self::Stale { .. } => "stale",
        }
    }
}
