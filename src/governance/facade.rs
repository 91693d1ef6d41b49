//! The read-only facade consumed by the (out-of-scope) API layer.
//!
//! Grounded on the prior runtime's `advanced_governance`'s `get_proposal`/
//! `get_voter`/`get_governance_stats` read methods: every getter here
//! acquires only the read locks it needs and returns an owned clone, never
//! a reference into locked state, so a caller cannot observe a mutation
//! mid-read or hold a lock past the call.

use serde::{Deserialize, Serialize};

use crate::ids::{Address, Hash};
use crate::token::TokenHolder;

use super::proposal::Proposal;
use super::state::GovernanceState;
use super::treasury::{PendingTx, TreasuryState};
use super::vote::Vote;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceStats {
    pub total_supply: u64,
    pub burned_cumulative: u64,
    pub proposal_count: usize,
    pub treasury_balance: u64,
}

pub struct GovernanceFacade {
    state: GovernanceState,
}

impl GovernanceFacade {
    pub fn new(state: GovernanceState) -> Self {
        Self { state }
    }

    pub async fn get_proposal(&self, id: &Hash) -> Option<Proposal> {
        self.state.proposals().read().await.get(id).cloned()
    }

    pub async fn list_proposals(&self) -> Vec<Proposal> {
        self.state.proposals().read().await.list()
    }

    pub async fn get_votes(&self, proposal_id: &Hash) -> Vec<Vote> {
        self.state.votes().read().await.get_votes(proposal_id)
    }

    pub async fn get_balance(&self, account: &Address) -> u64 {
        self.state.token().read().await.balance(account)
    }

    pub async fn get_holder(&self, account: &Address) -> Option<TokenHolder> {
        self.state.token().read().await.get_holder(account).cloned()
    }

    pub async fn get_allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.state.token().read().await.get_allowance(owner, spender)
    }

    pub async fn get_delegation(&self, delegator: &Address) -> Option<crate::delegation::Delegation> {
        self.state.delegation().read().await.get(delegator).cloned()
    }

    /// Acquires the token and delegation locks together (in fixed order)
    /// so the power figure reflects one consistent snapshot.
    pub async fn get_effective_power(&self, addr: &Address, now: i64) -> u64 {
        let token = self.state.token().read().await;
        let delegation = self.state.delegation().read().await;
        delegation.resolve_effective_power(addr, now, &token)
    }

    pub async fn get_treasury(&self) -> TreasuryState {
        self.state.treasury().read().await.clone()
    }

    pub async fn get_pending_tx(&self, tx_id: &Hash) -> Option<PendingTx> {
        self.state.treasury().read().await.get_pending(tx_id).cloned()
    }

    /// Acquires every sub-state's read lock together so the counts are a
    /// consistent per-block snapshot, matching the facade's "deep-enough
    /// copies" rule.
    pub async fn get_governance_stats(&self) -> GovernanceStats {
        let guard = self.state.read_all().await;
        GovernanceStats {
            total_supply: guard.token.total_supply(),
            burned_cumulative: guard.token.burned_cumulative(),
            proposal_count: guard.proposals.list().len(),
            treasury_balance: guard.treasury.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Address;

    #[tokio::test]
    async fn facade_reads_deep_copies_of_balances() {
        let state = GovernanceState::new();
        {
            let mut guard = state.write_all().await;
            guard.token.mint(&Address([1; 32]), 100, 0).unwrap();
        }
        let facade = GovernanceFacade::new(state);
        assert_eq!(facade.get_balance(&Address([1; 32])).await, 100);
        assert_eq!(facade.get_balance(&Address([2; 32])).await, 0);
    }
}
