//! # Proof Entities

use serde::{Deserialize, Serialize};
use shared_types::{TagPublicKey, Timestamp, WalletId, PUBKEY_SIZE};

use super::errors::ProofError;

/// Ed25519 signature length.
pub const SIGNATURE_SIZE: usize = 64;

/// Signed payload length: claimant (32) + timestamp (8) + onchain id (8).
pub const PROOF_PAYLOAD_SIZE: usize = PUBKEY_SIZE + 8 + 8;

/// A proof-of-visit as presented by a device.
///
/// Signature and payload stay as raw bytes so length checks happen in
/// verification rather than at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfVisit {
    pub tag: TagPublicKey,
    pub signature: Vec<u8>,
    pub payload: Vec<u8>,
    pub claimant: WalletId,
}

/// Decoded proof payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofPayload {
    pub claimant: WalletId,
    pub timestamp: Timestamp,
    pub onchain_id: u64,
}

impl ProofPayload {
    pub fn new(claimant: WalletId, timestamp: Timestamp, onchain_id: u64) -> Self {
        Self {
            claimant,
            timestamp,
            onchain_id,
        }
    }

    pub fn to_bytes(&self) -> [u8; PROOF_PAYLOAD_SIZE] {
        let mut out = [0u8; PROOF_PAYLOAD_SIZE];
        out[..32].copy_from_slice(self.claimant.as_bytes());
        out[32..40].copy_from_slice(&self.timestamp.to_le_bytes());
        out[40..48].copy_from_slice(&self.onchain_id.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let bytes: &[u8; PROOF_PAYLOAD_SIZE] =
            bytes
                .try_into()
                .map_err(|_| ProofError::MalformedPayload {
                    expected: PROOF_PAYLOAD_SIZE,
                    got: bytes.len(),
                })?;

        let mut claimant = [0u8; 32];
        claimant.copy_from_slice(&bytes[..32]);
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[32..40]);
        let mut id = [0u8; 8];
        id.copy_from_slice(&bytes[40..48]);

        Ok(Self {
            claimant: WalletId(claimant),
            timestamp: i64::from_le_bytes(ts),
            onchain_id: u64::from_le_bytes(id),
        })
    }
}

/// Result of a successful verification.
///
/// `claimant` is the identity the claim was made for, which is also the
/// identity the tag signed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedProof {
    pub tag: TagPublicKey,
    pub claimant: WalletId,
    pub timestamp: Timestamp,
    pub onchain_id: u64,
}
