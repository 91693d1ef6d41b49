//! Opaque content identifiers and addresses shared across the governance core.
//!
//! `Hash` is a 32-byte content identifier and `Address` an opaque
//! fixed-width verification key, both stringified as lowercase hex with
//! no prefix. The prior runtime's `blockchain::transaction` carries these
//! as bare `String`s; these are newtypes instead, to stop ad-hoc stringly
//! typing at the type boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte content hash, used for proposal ids, pending-transaction ids
/// and transaction content hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; 32]);

    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Hash(out)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        if bytes.len() != 32 {
            return None;
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Some(Hash(out))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// An address/verification key. Fixed at 32 bytes, the same width as a
/// schnorrkel public key, so a transaction's `from` address can double as
/// the verification key `SchnorrkelBackend` checks its signature against
/// with no separate key field on the envelope.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        if bytes.len() != 32 {
            return None;
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Some(Address(out))
    }

    /// Derives an address from a verification key. A 32-byte key (e.g. a
    /// schnorrkel public key) is used as-is, so the address is the key and
    /// `SchnorrkelBackend::verify` can check a signature against it
    /// directly. A key of any other length is content-hashed down to 32
    /// bytes, the way most chains derive a short address from a longer or
    /// differently-shaped key.
    pub fn from_public_key_bytes(pk: &[u8]) -> Self {
        if pk.len() == 32 {
            let mut out = [0u8; 32];
            out.copy_from_slice(pk);
            return Address(out);
        }
        Address(Hash::of(pk).0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
