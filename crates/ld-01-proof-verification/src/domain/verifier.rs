//! # Proof Verifier
//!
//! Pure functions; safe to call from any number of threads.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shared_types::{TagPublicKey, Timestamp, WalletId};

use super::entities::{ProofPayload, VerifiedProof, PROOF_PAYLOAD_SIZE, SIGNATURE_SIZE};
use super::errors::ProofError;

/// Default freshness window around the tap timestamp.
pub const DEFAULT_MAX_SKEW_SECS: i64 = 300;

/// Rebuild the message the tag must have signed.
///
/// The claimant segment comes from `claimant`, never from the presented
/// payload. Timestamp and campaign number are taken from the payload.
pub fn expected_message(
    payload: &[u8],
    claimant: &WalletId,
) -> Result<[u8; PROOF_PAYLOAD_SIZE], ProofError> {
    let decoded = ProofPayload::from_bytes(payload)?;
    Ok(ProofPayload::new(*claimant, decoded.timestamp, decoded.onchain_id).to_bytes())
}

/// Verify a proof-of-visit.
///
/// Length checks run before any curve operation so malformed input is
/// reported as such and not as a failed signature.
pub fn verify(
    tag: &TagPublicKey,
    signature: &[u8],
    payload: &[u8],
    claimant: &WalletId,
) -> Result<VerifiedProof, ProofError> {
    let sig_bytes: [u8; SIGNATURE_SIZE] =
        signature
            .try_into()
            .map_err(|_| ProofError::MalformedSignature {
                expected: SIGNATURE_SIZE,
                got: signature.len(),
            })?;

    let message = expected_message(payload, claimant)?;

    let key = VerifyingKey::from_bytes(tag.as_bytes()).map_err(|_| ProofError::InvalidTagKey)?;
    let sig = Signature::from_bytes(&sig_bytes);

    key.verify(&message, &sig)
        .map_err(|_| ProofError::VerificationFailed)?;

    let decoded = ProofPayload::from_bytes(&message)?;
    Ok(VerifiedProof {
        tag: *tag,
        claimant: *claimant,
        timestamp: decoded.timestamp,
        onchain_id: decoded.onchain_id,
    })
}

/// Reject taps further than `max_skew` seconds from `now` in either direction.
pub fn check_freshness(tapped_at: Timestamp, now: Timestamp, max_skew: i64) -> Result<(), ProofError> {
    if tapped_at.abs_diff(now) > max_skew.unsigned_abs() {
        return Err(ProofError::Stale {
            tapped_at,
            now,
            max_skew,
        });
    }
    Ok(())
}
