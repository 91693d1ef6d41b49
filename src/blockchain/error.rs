//! The block-level error taxonomy: structural and preconditional failures
//! in the envelope/chain integrity checks that sit above the governance
//! sub-states.
//!
//! Mirrors the prior runtime's `blockchain::error::BlockchainError` shape
//! (one flat `thiserror` enum covering block/transaction structural
//! failures), with `#[from] GovernanceError` added so a transaction
//! rejected by the DAO validator/processor surfaces through the same
//! error type the applier's dispatch loop returns.

use thiserror::Error;

use crate::governance::GovernanceError;

#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("block index {got} does not follow previous block index {expected}")]
    InvalidBlockIndex { expected: u32, got: u32 },
    #[error("block's prev_hash does not match the chain tip")]
    InvalidPrevHash,
    #[error("transaction signature verification failed")]
    InvalidSignature,
    #[error("invalid transaction nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: i64, got: i64 },
    #[error("insufficient funds for native transfer: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },
    #[error(transparent)]
    Governance(#[from] GovernanceError),
    #[error("malformed governance VM bytecode: {0}")]
    MalformedBytecode(#[from] crate::governance::vm::BytecodeError),
    #[error("no blocks in chain")]
    NoBlocksInChain,
} 