//! # Tag Signer
//!
//! Produces proofs the way a provisioned tag's secure element does. Used by
//! device simulators and tests; production tags never expose their key.

use ed25519_dalek::{Signer, SigningKey};
use shared_types::{TagPublicKey, Timestamp, WalletId};
use zeroize::Zeroize;

use super::entities::{ProofOfVisit, ProofPayload};

/// Ed25519 tag keypair.
pub struct TagSigner {
    signing_key: SigningKey,
}

impl TagSigner {
    /// Generate a random tag key.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn public_key(&self) -> TagPublicKey {
        TagPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign arbitrary bytes.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Build and sign a proof-of-visit for `claimant`.
    pub fn sign_visit(
        &self,
        claimant: WalletId,
        tapped_at: Timestamp,
        onchain_id: u64,
    ) -> ProofOfVisit {
        let payload = ProofPayload::new(claimant, tapped_at, onchain_id).to_bytes();
        let signature = self.sign(&payload);
        ProofOfVisit {
            tag: self.public_key(),
            signature: signature.to_vec(),
            payload: payload.to_vec(),
            claimant,
        }
    }
}

impl Drop for TagSigner {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for TagSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagSigner")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
