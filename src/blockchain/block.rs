//! The block container the applier drives.
//!
//! Grounded on the prior runtime's `blockchain::block::Block` (index, hash,
//! prev_hash, timestamp, transactions, a `calculate_hash` over the
//! Merkle root of its transactions) with the Proof-of-Work `task`/
//! `solution` fields dropped: block ordering is assumed delivered by an
//! external validator, so this core has nothing to verify about how a
//! block was produced, only what it contains.

use serde::{Deserialize, Serialize};

use crate::ids::Hash;

use super::transaction::Transaction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub index: u32,
    pub prev_hash: Hash,
    pub hash: Hash,
    pub timestamp: i64,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Builds a block and computes its hash. `timestamp` is supplied by
    /// the caller (the external validator/consensus layer) rather than
    /// sampled here, so block construction stays deterministic and
    /// testable.
    pub fn new(index: u32, prev_hash: Hash, transactions: Vec<Transaction>, timestamp: i64) -> Self {
        let mut block = Block {
            index,
            prev_hash,
            hash: Hash::ZERO,
            timestamp,
            transactions,
        };
        block.hash = block.calculate_hash();
        block
    }

    fn calculate_hash(&self) -> Hash {
        let tx_root = Transaction::merkle_root(&self.transactions);
        let mut bytes = Vec::with_capacity(4 + 32 + 8 + 32);
        bytes.extend_from_slice(&self.index.to_be_bytes());
        bytes.extend_from_slice(&self.prev_hash.0);
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes.extend_from_slice(&tx_root.0);
        Hash::of(&bytes)
    }
}
