//! The multi-sig treasury state machine.
//!
//! Grounded on the prior runtime's `advanced_governance::GovernanceBlockchainBridge`
//! bookkeeping style (plain maps, explicit record structs) and the
//! multi-sig shape sketched across the retrieval pack's treasury examples
//! (signer sets, accumulating signatures, an `executed` flag gating
//! disbursement exactly once). Signature identity here is a verified
//! signer address rather than raw signature bytes, since signature
//! verification itself is delegated to `crate::signing::SigningBackend`
//! at the processor layer (crypto primitives are out of this module's
//! scope) — the treasury only needs to know *which distinct signers*
//! have attested.

use crate::ids::{Address, Hash};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("required signatures must be at least 1 and at most the signer count")]
    InvalidThreshold,
    #[error("signer set must not contain duplicates")]
    DuplicateSigner,
    #[error("treasury has insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },
    #[error("amount must be nonzero")]
    InvalidAmount,
    #[error("pending transaction not found")]
    PendingTxNotFound,
    #[error("signer is not a member of the current signer set")]
    NotASigner,
    #[error("signer has already signed this pending transaction")]
    DuplicateSignature,
    #[error("pending transaction has expired")]
    Expired,
    #[error("pending transaction already executed")]
    AlreadyExecuted,
    #[error("insufficient signatures: required {required}, got {got}")]
    InsufficientSignatures { required: u8, got: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTx {
    pub id: Hash,
    pub recipient: Address,
    pub amount: u64,
    pub purpose: String,
    pub signatures: Vec<Address>,
    pub created_at: i64,
    pub expires_at: i64,
    pub executed: bool,
}

impl PendingTx {
    fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TreasuryState {
    pub balance: u64,
    pub signers: HashSet<Address>,
    pub required_sigs: u8,
    pub transactions: HashMap<Hash, PendingTx>,
}

impl TreasuryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `k >= 1`, `k <= |signers|`, signers distinct. Idempotent only when
    /// called again with identical arguments.
    pub fn initialize(
        &mut self,
        signers: Vec<Address>,
        required_sigs: u8,
        initial_balance: u64,
    ) -> Result<(), TreasuryError> {
        let mut set = HashSet::new();
        for s in &signers {
            if !set.insert(*s) {
                return Err(TreasuryError::DuplicateSigner);
            }
        }
        if required_sigs == 0 || (required_sigs as usize) > set.len() {
            return Err(TreasuryError::InvalidThreshold);
        }
        self.signers = set;
        self.required_sigs = required_sigs;
        self.balance = initial_balance;
        Ok(())
    }

    /// Deposits into the treasury balance (e.g. from an executed token
    /// transfer to the treasury account). Separate from `create_pending`,
    /// which never mutates the balance.
    pub fn deposit(&mut self, amount: u64) {
        self.balance += amount;
    }

    /// Inserts a pending transaction; does **not** debit the treasury.
    pub fn create_pending(
        &mut self,
        id: Hash,
        recipient: Address,
        amount: u64,
        purpose: String,
        now: i64,
        ttl_seconds: i64,
    ) -> Result<(), TreasuryError> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }
        if self.balance < amount {
            return Err(TreasuryError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.transactions.insert(
            id,
            PendingTx {
                id,
                recipient,
                amount,
                purpose,
                signatures: Vec::new(),
                created_at: now,
                expires_at: now + ttl_seconds,
                executed: false,
            },
        );
        Ok(())
    }

    /// Appends a verified signer's signature. Rejects non-signers,
    /// duplicate signatures from the same signer, and expired transactions.
    pub fn sign(&mut self, tx_id: &Hash, signer: Address, now: i64) -> Result<(), TreasuryError> {
        if !self.signers.contains(&signer) {
            return Err(TreasuryError::NotASigner);
        }
        let tx = self
            .transactions
            .get_mut(tx_id)
            .ok_or(TreasuryError::PendingTxNotFound)?;
        if tx.is_expired(now) {
            return Err(TreasuryError::Expired);
        }
        if tx.signatures.contains(&signer) {
            return Err(TreasuryError::DuplicateSignature);
        }
        tx.signatures.push(signer);
        Ok(())
    }

    /// Requires `|signatures| >= required_sigs`, not executed, not
    /// expired, and sufficient balance; debits the treasury and returns
    /// the recipient/amount for the caller to credit via the token
    /// ledger. Idempotent: a repeat call on an already-executed tx is a
    /// no-op that reports `AlreadyExecuted` without debiting again.
    pub fn execute(&mut self, tx_id: &Hash, now: i64) -> Result<(Address, u64), TreasuryError> {
        let required = self.required_sigs;
        let balance = self.balance;
        let tx = self
            .transactions
            .get_mut(tx_id)
            .ok_or(TreasuryError::PendingTxNotFound)?;

        if tx.executed {
            return Err(TreasuryError::AlreadyExecuted);
        }
        if tx.is_expired(now) {
            return Err(TreasuryError::Expired);
        }
        // Distinct-signer count: signers are only ever appended once per
        // signer (sign() rejects duplicates), but re-derive defensively so
        // the multi-sig-safety invariant holds even if that changes.
        let distinct: HashSet<Address> = tx.signatures.iter().copied().collect();
        if (distinct.len() as u8) < required {
            return Err(TreasuryError::InsufficientSignatures {
                required,
                got: distinct.len() as u8,
            });
        }
        if balance < tx.amount {
            return Err(TreasuryError::InsufficientFunds {
                required: tx.amount,
                available: balance,
            });
        }

        tx.executed = true;
        let recipient = tx.recipient;
        let amount = tx.amount;
        self.balance -= amount;
        Ok((recipient, amount))
    }

    pub fn get_pending(&self, tx_id: &Hash) -> Option<&PendingTx> {
        self.transactions.get(tx_id)
    }

    /// Expires pending transactions past `expires_at`, dropping them from
    /// the active set — the periodic sweep's bound on the pending-tx table
    /// size.
    pub fn sweep_expired(&mut self, now: i64) {
        self.transactions
            .retain(|_, tx| tx.executed || !tx.is_expired(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    #[test]
    fn initialize_rejects_threshold_over_signer_count() {
        let mut treasury = TreasuryState::new();
        assert_eq!(
            treasury.initialize(vec![addr(1), addr(2)], 3, 0),
            Err(TreasuryError::InvalidThreshold)
        );
    }

    #[test]
    fn multisig_flow_matches_scenario_four() {
        let mut treasury = TreasuryState::new();
        treasury
            .initialize(vec![addr(1), addr(2), addr(3)], 2, 100_000)
            .unwrap();

        let tx_id = Hash([7; 32]);
        treasury
            .create_pending(tx_id, addr(9), 10_000, "payout".into(), 0, 86_400)
            .unwrap();
        assert_eq!(treasury.balance, 100_000); // create does not debit

        treasury.sign(&tx_id, addr(1), 10).unwrap();
        treasury.sign(&tx_id, addr(2), 20).unwrap();

        let (recipient, amount) = treasury.execute(&tx_id, 30).unwrap();
        assert_eq!(recipient, addr(9));
        assert_eq!(amount, 10_000);
        assert_eq!(treasury.balance, 90_000);

        assert_eq!(treasury.execute(&tx_id, 31), Err(TreasuryError::AlreadyExecuted));
        assert_eq!(treasury.balance, 90_000); // no double debit
    }

    #[test]
    fn insufficient_signers_cannot_execute() {
        let mut treasury = TreasuryState::new();
        treasury.initialize(vec![addr(1), addr(2), addr(3)], 2, 1_000).unwrap();
        let tx_id = Hash([1; 32]);
        treasury.create_pending(tx_id, addr(9), 100, "p".into(), 0, 86_400).unwrap();
        treasury.sign(&tx_id, addr(1), 0).unwrap();
        assert_eq!(
            treasury.execute(&tx_id, 1),
            Err(TreasuryError::InsufficientSignatures { required: 2, got: 1 })
        );
    }

    #[test]
    fn non_signer_cannot_sign() {
        let mut treasury = TreasuryState::new();
        treasury.initialize(vec![addr(1)], 1, 1_000).unwrap();
        let tx_id = Hash([1; 32]);
        treasury.create_pending(tx_id, addr(9), 100, "p".into(), 0, 86_400).unwrap();
        assert_eq!(
            treasury.sign(&tx_id, addr(66), 0),
            Err(TreasuryError::NotASigner)
        );
    }

    #[test]
    fn duplicate_signature_from_same_signer_rejected() {
        let mut treasury = TreasuryState::new();
        treasury.initialize(vec![addr(1), addr(2)], 2, 1_000).unwrap();
        let tx_id = Hash([1; 32]);
        treasury.create_pending(tx_id, addr(9), 100, "p".into(), 0, 86_400).unwrap();
        treasury.sign(&tx_id, addr(1), 0).unwrap();
        assert_eq!(
            treasury.sign(&tx_id, addr(1), 0),
            Err(TreasuryError::DuplicateSignature)
        );
    }

    #[test]
    fn expired_pending_tx_cannot_execute() {
        let mut treasury = TreasuryState::new();
        treasury.initialize(vec![addr(1)], 1, 1_000).unwrap();
        let tx_id = Hash([1; 32]);
        treasury.create_pending(tx_id, addr(9), 100, "p".into(), 0, 10).unwrap();
        treasury.sign(&tx_id, addr(1), 0).unwrap();
        assert_eq!(treasury.execute(&tx_id, 11), Err(TreasuryError::Expired));
    }

    #[test]
    fn sweep_drops_expired_unexecuted_transactions() {
        let mut treasury = TreasuryState::new();
        treasury.initialize(vec![addr(1)], 1, 1_000).unwrap();
        let tx_id = Hash([1; 32]);
        treasury.create_pending(tx_id, addr(9), 100, "p".into(), 0, 10).unwrap();
        treasury.sweep_expired(11);
        assert!(treasury.get_pending(&tx_id).is_none());
    }
}
