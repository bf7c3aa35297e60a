//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{ProofOfVisit, VerifiedProof};
use crate::domain::errors::ProofError;

/// Proof verification API consumed by claim admission.
///
/// Implementations must be stateless with respect to proofs and safe to
/// share across threads.
pub trait ProofVerificationApi: Send + Sync {
    /// Cryptographically verify a proof-of-visit.
    fn verify(&self, proof: &ProofOfVisit) -> Result<VerifiedProof, ProofError>;

    /// Check the tap timestamp against `now`.
    fn check_fresh(&self, proof: &VerifiedProof, now: i64) -> Result<(), ProofError>;
}
