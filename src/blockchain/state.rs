//! The chain-level index: ordered blocks, a transaction location index,
//! and per-account nonces. Distinct from `governance::GovernanceState`,
//! which owns the DAO sub-states (token ledger, delegations, proposals,
//! treasury) — this is the "chain lock" half of the two-lock split,
//! guarding only the block/header/tx indices, never the governance
//! sub-states themselves.
//!
//! Grounded on the prior runtime's `blockchain::state::BlockchainState`, which
//! held the single balances map the old PoW chain mutated directly; here
//! that responsibility has moved entirely into the token ledger, so this
//! struct is left with exactly the chain-indexing concerns the chain
//! lock is responsible for.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{Address, Hash};

use super::block::Block;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChainIndex {
    blocks: Vec<Block>,
    /// `content_hash -> (block_index, position_in_block)`.
    tx_index: HashMap<Hash, (u32, usize)>,
    /// Next expected nonce per sender address.
    nonces: HashMap<Address, i64>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn height(&self) -> u32 {
        self.blocks.len() as u32
    }

    pub fn get_block(&self, index: u32) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn next_nonce(&self, address: &Address) -> i64 {
        *self.nonces.get(address).unwrap_or(&0)
    }

    pub fn locate_transaction(&self, content_hash: &Hash) -> Option<(u32, usize)> {
        self.tx_index.get(content_hash).copied()
    }

    /// Appends a block that has already been validated and applied,
    /// indexing its transactions and advancing sender nonces. Never
    /// fails: structural validation happens before this is called.
    pub fn append(&mut self, block: Block) {
        let index = block.index;
        for (pos, tx) in block.transactions.iter().enumerate() {
            self.tx_index.insert(tx.content_hash(), (index, pos));
            self.nonces.insert(tx.from, tx.nonce + 1);
        }
        self.blocks.push(block);
    }
} 