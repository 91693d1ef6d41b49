//! The swappable persistence port.
//!
//! Disk-backed persistence is out of the core's scope: the core runs over
//! a swappable storage port instead. Grounded on the prior runtime's
//! pattern of keeping storage behind a narrow trait (see
//! `distributed_storage/storage.rs`'s `StorageBackend` trait) rather than
//! baking a specific backend into the state machine; the snapshot shape
//! follows the persisted-state-layout fields a node would actually need
//! to restore from cold.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::delegation::Delegation;
use crate::governance::{PendingTx, Proposal, Vote};
use crate::ids::{Address, Hash};
use crate::token::TokenHolder;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistence backend failure: {0}")]
    BackendFailure(String),
}

/// A point-in-time, serializable view of every persisted sub-state a node
/// would need to restore from cold. Schema evolution is explicitly out
/// of scope; this is a flat snapshot, not a migratable schema.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StateSnapshot {
    pub applied_block_height: u32,
    pub proposals: Vec<Proposal>,
    pub votes: Vec<(Hash, Vec<Vote>)>,
    pub delegations: Vec<(Address, Delegation)>,
    pub token_holders: Vec<TokenHolder>,
    pub allowances: Vec<((Address, Address), u64)>,
    pub treasury_balance: u64,
    pub treasury_signers: Vec<Address>,
    pub treasury_required_sigs: u8,
    pub pending_treasury_txs: Vec<PendingTx>,
}

/// A collaborator the core depends on but does not implement: whatever
/// durably persists a `StateSnapshot`. An in-memory no-op is provided for
/// tests and the CLI demo, which never need durability across process
/// restarts.
pub trait StorageSink: Send + Sync {
    fn persist_snapshot(&self, snapshot: &StateSnapshot) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct NoopStorage;

impl StorageSink for NoopStorage {
    fn persist_snapshot(&self, _snapshot: &StateSnapshot) -> Result<(), StorageError> {
        Ok(())
    }
}
