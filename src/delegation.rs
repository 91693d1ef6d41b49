//! The delegation graph and effective-voting-power resolver.
//!
//! Delegation does not chain: at most one record per delegator, and
//! `resolve_effective_power` only ever looks one hop in either direction.
//! The prior runtime's `advanced_governance::DelegatedVote` models a
//! delegation record with a type/expiry; this module keeps that shape but
//! drops the prior runtime's `get_delegation_depth` placeholder (it hints
//! at chained delegation, which this system forbids) in favor of the
//! one-hop resolver below.

use crate::ids::Address;
use crate::token::TokenLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delegation {
    pub delegator: Address,
    pub delegate: Address,
    pub start_time: i64,
    pub end_time: i64,
    pub active: bool,
}

impl Delegation {
    pub fn is_effective(&self, now: i64) -> bool {
        self.active && self.start_time <= now && now <= self.end_time
    }
}

/// At most one delegation record per delegator address.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DelegationGraph {
    records: HashMap<Address, Delegation>,
}

impl DelegationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, delegator: &Address) -> Option<&Delegation> {
        self.records.get(delegator)
    }

    /// Replaces any existing record for `from` with a fresh active one.
    /// Self-delegation is accepted and has no effect on power (own power is
    /// only zeroed when delegating to *another* address — see
    /// `resolve_effective_power`).
    pub fn delegate(&mut self, from: Address, to: Address, now: i64, duration_seconds: i64) {
        self.records.insert(
            from,
            Delegation {
                delegator: from,
                delegate: to,
                start_time: now,
                end_time: now + duration_seconds,
                active: true,
            },
        );
    }

    /// Sets the existing record's `active = false`. Missing record is a
    /// no-op success.
    pub fn revoke(&mut self, from: &Address) {
        if let Some(record) = self.records.get_mut(from) {
            record.active = false;
        }
    }

    /// `own + incoming`, where `own` is zero only when `addr` has an
    /// effective outgoing delegation to someone *other than itself*, and
    /// `incoming` sums the balances of every delegator whose effective
    /// delegation points at `addr`. Not transitive: a chain A->B->C gives
    /// C only B's own balance, never A's.
    pub fn resolve_effective_power(&self, addr: &Address, now: i64, ledger: &TokenLedger) -> u64 {
        let delegated_away = self
            .records
            .get(addr)
            .map(|d| d.is_effective(now) && d.delegate != *addr)
            .unwrap_or(false);

        let own = if delegated_away { 0 } else { ledger.balance(addr) };

        let incoming: u64 = self
            .records
            .values()
            .filter(|d| d.delegate == *addr && d.delegator != *addr && d.is_effective(now))
            .map(|d| ledger.balance(&d.delegator))
            .sum();

        own + incoming
    }
}
