//! The governance token ledger.
//!
//! Grounded on the prior runtime's `token::TokenLedger` (balances + stakes maps,
//! `mint`/`transfer`/`stake`/`unstake`), generalized to a fuller holder
//! record and allowance map: `TokenHolder` adds `reputation`, `joined_at`
//! and `last_active`, and the ledger grows `approve`/`transfer_from`/
//! `burn` on top of the prior runtime's `mint`/`transfer`.

use crate::ids::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("amount must be nonzero")]
    InvalidAmount,
    #[error("insufficient tokens: required {required}, available {available}")]
    InsufficientTokens { required: u64, available: u64 },
    #[error("insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: u64, available: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHolder {
    pub address: Address,
    pub balance: u64,
    pub staked: u64,
    pub reputation: u64,
    pub joined_at: i64,
    pub last_active: i64,
}

impl TokenHolder {
    fn new(address: Address, now: i64) -> Self {
        Self {
            address,
            balance: 0,
            staked: 0,
            reputation: 0,
            joined_at: now,
            last_active: now,
        }
    }
}

/// Balances, allowances, mint/burn/transfer with the conservation invariant
/// `total_supply == sum(balance) + burned_cumulative`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenLedger {
    holders: HashMap<Address, TokenHolder>,
    allowances: HashMap<(Address, Address), u64>,
    total_supply: u64,
    burned_cumulative: u64,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: &Address) -> u64 {
        self.holders.get(account).map(|h| h.balance).unwrap_or(0)
    }

    pub fn staked(&self, account: &Address) -> u64 {
        self.holders.get(account).map(|h| h.staked).unwrap_or(0)
    }

    pub fn reputation(&self, account: &Address) -> u64 {
        self.holders.get(account).map(|h| h.reputation).unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn burned_cumulative(&self) -> u64 {
        self.burned_cumulative
    }

    pub fn get_allowance(&self, owner: &Address, spender: &Address) -> u64 {
        *self.allowances.get(&(*owner, *spender)).unwrap_or(&0)
    }

    pub fn get_holder(&self, account: &Address) -> Option<&TokenHolder> {
        self.holders.get(account)
    }

    fn touch(&mut self, account: &Address, now: i64) -> &mut TokenHolder {
        self.holders
            .entry(*account)
            .or_insert_with(|| TokenHolder::new(*account, now))
    }

    /// Creates the holder lazily if absent; credits balance and total supply.
    pub fn mint(&mut self, to: &Address, amount: u64, now: i64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let holder = self.touch(to, now);
        holder.balance += amount;
        holder.last_active = now;
        self.total_supply += amount;
        Ok(())
    }

    /// Debits balance and total supply; fails if the holder's balance is short.
    pub fn burn(&mut self, from: &Address, amount: u64, now: i64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let available = self.balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientTokens {
                required: amount,
                available,
            });
        }
        let holder = self.touch(from, now);
        holder.balance -= amount;
        holder.last_active = now;
        self.total_supply -= amount;
        self.burned_cumulative += amount;
        Ok(())
    }

    /// Atomic debit+credit. `from == to` is a no-op that still succeeds.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u64,
        now: i64,
    ) -> Result<(), LedgerError> {
        if from == to {
            self.touch(from, now).last_active = now;
            return Ok(());
        }
        let available = self.balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientTokens {
                required: amount,
                available,
            });
        }
        self.touch(from, now).balance -= amount;
        self.touch(from, now).last_active = now;
        self.touch(to, now).balance += amount;
        self.touch(to, now).last_active = now;
        Ok(())
    }

    /// Sets (does not add to) the allowance. Approving `0` deletes the entry.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u64, now: i64) {
        self.touch(owner, now).last_active = now;
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    /// Spends from `owner`'s allowance granted to `spender`, transferring to `to`.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u64,
        now: i64,
    ) -> Result<(), LedgerError> {
        let allowed = self.get_allowance(owner, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }
        let available = self.balance(owner);
        if available < amount {
            return Err(LedgerError::InsufficientTokens {
                required: amount,
                available,
            });
        }
        self.allowances.insert((*owner, *spender), allowed - amount);
        self.transfer(owner, to, amount, now)?;
        self.touch(spender, now).last_active = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    #[test]
    fn mint_zero_is_rejected() {
        let mut ledger = TokenLedger::new();
        assert_eq!(ledger.mint(&addr(1), 0, 0), Err(LedgerError::InvalidAmount));
    }

    #[test]
    fn mint_and_burn_round_trip_conserves_supply() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 500, 0).unwrap();
        let supply_before = ledger.total_supply();
        let balance_before = ledger.balance(&addr(1));

        ledger.mint(&addr(1), 300, 1).unwrap();
        ledger.burn(&addr(1), 300, 2).unwrap();

        assert_eq!(ledger.total_supply(), supply_before);
        assert_eq!(ledger.balance(&addr(1)), balance_before);
    }

    #[test]
    fn transfer_insufficient_balance_fails() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 10, 0).unwrap();
        assert_eq!(
            ledger.transfer(&addr(1), &addr(2), 11, 0),
            Err(LedgerError::InsufficientTokens {
                required: 11,
                available: 10
            })
        );
    }

    #[test]
    fn self_transfer_is_a_no_op_success() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 10, 0).unwrap();
        ledger.transfer(&addr(1), &addr(1), 10, 1).unwrap();
        assert_eq!(ledger.balance(&addr(1)), 10);
    }

    #[test]
    fn approve_zero_deletes_allowance() {
        let mut ledger = TokenLedger::new();
        ledger.approve(&addr(1), &addr(2), 50, 0);
        assert_eq!(ledger.get_allowance(&addr(1), &addr(2)), 50);
        ledger.approve(&addr(1), &addr(2), 0, 1);
        assert_eq!(ledger.get_allowance(&addr(1), &addr(2)), 0);
    }

    #[test]
    fn transfer_from_respects_allowance_and_balance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(&addr(1), 100, 0).unwrap();
        ledger.approve(&addr(1), &addr(2), 40, 0);

        assert_eq!(
            ledger.transfer_from(&addr(2), &addr(1), &addr(3), 41, 1),
            Err(LedgerError::InsufficientAllowance {
                required: 41,
                available: 40
            })
        );

        ledger.transfer_from(&addr(2), &addr(1), &addr(3), 40, 1).unwrap();
        assert_eq!(ledger.balance(&addr(1)), 60);
        assert_eq!(ledger.balance(&addr(3)), 40);
        assert_eq!(ledger.get_allowance(&addr(1), &addr(2)), 0);
    }
}
