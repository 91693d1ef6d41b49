//! Pure, pre-apply structural checks, applying the same "validate, don't
//! mutate" discipline at the block/envelope layer that the DAO-kind
//! preconditions use in `governance::validator`.
//!
//! Grounded on the prior runtime's `blockchain::validation` module
//! (structural block checks, then a signature/nonce/balance pass over a
//! transaction), minus the PoW solution check: consensus algorithm design
//! is out of scope here.

use crate::signing::SigningBackend;

use super::block::Block;
use super::error::BlockchainError;
use super::transaction::Transaction;

/// Checks a new block's index and `prev_hash` against the chain tip.
pub fn validate_block_structure(block: &Block, prev_block: &Block) -> Result<(), BlockchainError> {
    if block.index != prev_block.index + 1 {
        return Err(BlockchainError::InvalidBlockIndex {
            expected: prev_block.index + 1,
            got: block.index,
        });
    }
    if block.prev_hash != prev_block.hash {
        return Err(BlockchainError::InvalidPrevHash);
    }
    Ok(())
}

/// Verifies a transaction's signature and its sender's nonce, the two
/// envelope-level checks that apply uniformly regardless of `TxType`.
/// Balance/fee sufficiency is a DAO-kind-specific concern left to
/// `governance::validator`.
pub fn validate_transaction_envelope(
    tx: &Transaction,
    expected_nonce: i64,
    signing: &dyn SigningBackend,
) -> Result<(), BlockchainError> {
    if !tx.verify_signature(signing) {
        return Err(BlockchainError::InvalidSignature);
    }
    if tx.nonce != expected_nonce {
        return Err(BlockchainError::InvalidNonce {
            expected: expected_nonce,
            got: tx.nonce,
        });
    }
    Ok(())
}

/// A native value move (`tx.value > 0` with no DAO/NFT/VM payload) has no
/// sub-state of its own; it debits/credits the token ledger directly, so
/// validation here is just a balance check against the caller-supplied
/// balance rather than re-deriving ledger access in this module.
pub fn validate_native_transfer(
    sender_balance: u64,
    amount: u64,
) -> Result<(), BlockchainError> {
    if sender_balance < amount {
        return Err(BlockchainError::InsufficientFunds {
            required: amount,
            available: sender_balance,
        });
    }
    Ok(())
}
