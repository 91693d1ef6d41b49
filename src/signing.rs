//! Signature verification as a swappable collaborator.
//!
//! Cryptographic primitive implementations stay out of the core's scope:
//! the core consumes a signing/verifying capability. This module defines
//! that capability as a trait and ships a default implementation grounded
//! on the prior runtime's actual scheme (`schnorrkel` with a fixed signing
//! context), rather than inventing one.

use schnorrkel::{signing_context, PublicKey as SchnorrkelPublicKey, Signature as SchnorrkelSignature};

/// Domain-separation context for all governance transaction signatures,
/// mirrors `blockchain::constants::SIGNING_CONTEXT` in the prior runtime.
pub const SIGNING_CONTEXT: &[u8] = b"dao-governance-transaction";

/// A verifying capability the core depends on but does not implement.
pub trait SigningBackend: Send + Sync {
    /// Verifies `sig` over `message` under `signer`. Malformed keys or
    /// signatures are a verification failure, not a panic.
    fn verify(&self, signer_bytes: &[u8], message: &[u8], sig_bytes: &[u8]) -> bool;
}

/// Default backend: schnorrkel signatures under a fixed signing context,
/// the scheme the prior runtime's `blockchain::transaction` module already uses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchnorrkelBackend;

impl SigningBackend for SchnorrkelBackend {
    fn verify(&self, signer_bytes: &[u8], message: &[u8], sig_bytes: &[u8]) -> bool {
        let Ok(pk) = SchnorrkelPublicKey::from_bytes(signer_bytes) else {
            return false;
        };
        let Ok(sig) = SchnorrkelSignature::from_bytes(sig_bytes) else {
            return false;
        };
        pk.verify(signing_context(SIGNING_CONTEXT).bytes(message), &sig)
            .is_ok()
    }
}

/// Test/demo backend that accepts every signature, so governance logic can
/// be exercised without generating real keypairs in every unit test.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllBackend;

impl SigningBackend for AcceptAllBackend {
    fn verify(&self, _signer_bytes: &[u8], _message: &[u8], _sig_bytes: &[u8]) -> bool {
        true
    }
}
