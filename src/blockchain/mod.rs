//! The chain layer: block/transaction envelope shapes, the chain index,
//! envelope-level validation, the per-block transaction applier, and the
//! `Blockchain` that wires all of it to the governance engine.

pub mod applier;
pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod state;
pub mod storage;
pub mod transaction;
pub mod validation;

pub use block::Block;
pub use chain::Blockchain;
pub use config::BlockchainConfig;
pub use error::BlockchainError;
pub use state::ChainIndex;
pub use storage::{NoopStorage, StateSnapshot, StorageSink};
pub use transaction::{DaoTx, GovernanceParameter, TreasuryAction, Transaction, TxInner, TxType};
