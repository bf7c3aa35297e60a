//! # Proof Verification Subsystem (LD-01)
//!
//! Verifies the Ed25519 proof-of-visit a tag produces when a device taps it.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure verification logic, payload codec,
//!   tag signer
//! - **Ports Layer** (`ports/`): `ProofVerificationApi`
//! - **Service Layer** (`service.rs`): `Ed25519ProofVerifier`
//!
//! ## Proof Payload
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┬──────────────────────┐
//! │ claimant wallet (32) │ tap timestamp i64 LE │ onchain_id u64 LE    │
//! └──────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! The tag signs the 48-byte payload. During verification the claimant
//! segment is rebuilt from the claimant identity presented with the claim,
//! so a proof captured for one wallet cannot be replayed for another.
//!
//! ## Error Classes
//!
//! | Error | Class |
//! |-------|-------|
//! | `MalformedSignature`, `MalformedPayload`, `InvalidTagKey` | Malformed |
//! | `VerificationFailed` | Invalid |
//!
//! Verification is stateless and never retried.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{
    ProofOfVisit, ProofPayload, VerifiedProof, PROOF_PAYLOAD_SIZE, SIGNATURE_SIZE,
};
pub use domain::errors::ProofError;
pub use domain::signer::TagSigner;
pub use domain::verifier::{check_freshness, expected_message, verify, DEFAULT_MAX_SKEW_SECS};
pub use ports::inbound::ProofVerificationApi;
pub use service::Ed25519ProofVerifier;
