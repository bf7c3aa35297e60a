//! # Proof Verification Service
//!
//! Implements `ProofVerificationApi` over the pure domain functions.

use tracing::debug;

use crate::domain::entities::{ProofOfVisit, VerifiedProof};
use crate::domain::errors::ProofError;
use crate::domain::verifier::{self, DEFAULT_MAX_SKEW_SECS};
use crate::ports::inbound::ProofVerificationApi;

/// Ed25519 proof verifier with a configurable freshness window.
#[derive(Debug, Clone, Copy)]
pub struct Ed25519ProofVerifier {
    max_skew_secs: i64,
}

impl Default for Ed25519ProofVerifier {
    fn default() -> Self {
        Self {
            max_skew_secs: DEFAULT_MAX_SKEW_SECS,
        }
    }
}

impl Ed25519ProofVerifier {
    pub fn new(max_skew_secs: i64) -> Self {
        Self { max_skew_secs }
    }

    pub fn max_skew_secs(&self) -> i64 {
        self.max_skew_secs
    }
}

impl ProofVerificationApi for Ed25519ProofVerifier {
    fn verify(&self, proof: &ProofOfVisit) -> Result<VerifiedProof, ProofError> {
        verifier::verify(&proof.tag, &proof.signature, &proof.payload, &proof.claimant).map_err(
            |e| {
                debug!(tag = %proof.tag, claimant = %proof.claimant, error = %e, "[ld-01] proof rejected");
                e
            },
        )
    }

    fn check_fresh(&self, proof: &VerifiedProof, now: i64) -> Result<(), ProofError> {
        verifier::check_freshness(proof.timestamp, now, self.max_skew_secs)
    }
}
