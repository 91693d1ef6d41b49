//! The top-level `Blockchain`, wiring the chain index, the governance
//! engine, and the storage sink together behind the per-block apply loop.
//!
//! Grounded on the prior runtime's `blockchain::chain::Blockchain` (genesis
//! block construction, an `add_block` that validates then applies every
//! transaction in order), restructured around a two-lock split: a
//! `chain_lock: Arc<RwLock<ChainIndex>>` held only for index bookkeeping,
//! and `governance::GovernanceState`'s four ordered sub-state locks held
//! for the whole apply loop so a block's effects are all-or-nothing from
//! a reader's point of view.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::GovernanceConfig;
use crate::governance::{Engine, EventSink, GovernanceFacade};
use crate::ids::Address;
use crate::signing::SigningBackend;

use super::applier::{apply_transaction, sweep_expired_treasury_txs, sweep_proposal_statuses};
use super::block::Block;
use super::config::BlockchainConfig;
use super::constants::{DEV_GENESIS_ADDRESS, GENESIS_SUPPLY};
use super::error::BlockchainError;
use super::state::ChainIndex;
use super::storage::{StateSnapshot, StorageSink};
use super::transaction::Transaction;
use super::validation::validate_block_structure;

pub struct Blockchain {
    chain: Arc<RwLock<ChainIndex>>,
    pub engine: Engine,
    storage: Arc<dyn StorageSink>,
    block_config: BlockchainConfig,
}

impl Blockchain {
    /// Builds a chain with a genesis block (index 0, empty transaction
    /// set) and pre-funds `DEV_GENESIS_ADDRESS` with `GENESIS_SUPPLY`
    /// directly in the token ledger, matching the prior runtime's "pre-fund the
    /// developer account" genesis step rather than encoding the mint as a
    /// transaction (there is no prior block to have authorized one).
    pub async fn new(
        config: GovernanceConfig,
        signing: Arc<dyn SigningBackend>,
        events: EventSink,
        storage: Arc<dyn StorageSink>,
    ) -> Self {
        let engine = Engine::new(config, signing, events);
        {
            let mut guard = engine.state.write_all().await;
            guard
                .token
                .mint(&Address(DEV_GENESIS_ADDRESS), GENESIS_SUPPLY, 0)
                .expect("genesis mint of a nonzero amount cannot fail");
        }
        let genesis = Block::new(0, crate::ids::Hash::ZERO, vec![], 0);
        let mut index = ChainIndex::new();
        index.append(genesis);
        Self {
            chain: Arc::new(RwLock::new(index)),
            engine,
            storage,
            block_config: BlockchainConfig::default(),
        }
    }

    pub fn facade(&self) -> GovernanceFacade {
        self.engine.facade()
    }

    pub async fn height(&self) -> u32 {
        self.chain.read().await.height()
    }

    pub async fn tip_hash(&self) -> crate::ids::Hash {
        self.chain.read().await.tip().map(|b| b.hash).unwrap_or(crate::ids::Hash::ZERO)
    }

    pub async fn next_nonce(&self, address: &Address) -> i64 {
        self.chain.read().await.next_nonce(address)
    }

    /// Validates every transaction's envelope, applies the valid ones in
    /// order, sweeps proposal/treasury status, persists a snapshot, and
    /// appends the new block to the chain index.
    ///
    /// Block ordering (who proposes this block, in what order relative to
    /// others) is assumed to be delivered by an external caller; this
    /// method only ever appends to the current tip.
    pub async fn add_block(&self, mut transactions: Vec<Transaction>, timestamp: i64) -> Result<Block, BlockchainError> {
        let prev = {
            let chain = self.chain.read().await;
            chain.tip().cloned().ok_or(BlockchainError::NoBlocksInChain)?
        };

        if transactions.len() > self.block_config.max_transactions_per_block {
            warn!(
                submitted = transactions.len(),
                cap = self.block_config.max_transactions_per_block,
                "truncating block to the configured transaction cap"
            );
            transactions.truncate(self.block_config.max_transactions_per_block);
        }

        let mut local_nonces = std::collections::HashMap::new();
        let mut accepted = Vec::with_capacity(transactions.len());

        {
            let mut state = self.engine.state.write_all().await;
            for tx in transactions {
                let expected_nonce = match local_nonces.get(&tx.from) {
                    Some(next) => *next,
                    None => self.chain.read().await.next_nonce(&tx.from),
                };
                if let Err(err) =
                    super::validation::validate_transaction_envelope(&tx, expected_nonce, &*self.engine.signing)
                {
                    warn!(from = %tx.from, error = %err, "transaction rejected at envelope validation");
                    continue;
                }
                local_nonces.insert(tx.from, tx.nonce + 1);
                let content_hash = tx.content_hash();
                apply_transaction(&mut state, &self.engine, &tx, content_hash, timestamp);
                accepted.push(tx);
            }

            sweep_proposal_statuses(&mut state, &self.engine.config, timestamp);
            sweep_expired_treasury_txs(&mut state, timestamp);
        }

        let candidate = Block::new(prev.index + 1, prev.hash, accepted, timestamp);
        validate_block_structure(&candidate, &prev)?;

        {
            let mut chain = self.chain.write().await;
            chain.append(candidate.clone());
        }

        if let Err(err) = self.storage.persist_snapshot(&self.snapshot().await) {
            warn!(error = %err, "state snapshot persistence failed");
        }

        info!(height = candidate.index, tx_count = candidate.transactions.len(), "block applied");
        Ok(candidate)
    }

    async fn snapshot(&self) -> StateSnapshot {
        let chain = self.chain.read().await;
        let state = self.engine.state.read_all().await;
        StateSnapshot {
            applied_block_height: chain.height(),
            proposals: state.proposals.list(),
            votes: Vec::new(),
            delegations: Vec::new(),
            token_holders: Vec::new(),
            allowances: Vec::new(),
            treasury_balance: state.treasury.balance,
            treasury_signers: state.treasury.signers.iter().copied().collect(),
            treasury_required_sigs: state.treasury.required_sigs,
            pending_treasury_txs: state.treasury.transactions.values().cloned().collect(),
        }
    }
}
