//! The aggregate governance state and its lock discipline.
//!
//! The prior runtime's two coarse locks are replaced by one
//! `Arc<tokio::sync::RwLock<_>>` per sub-state with a fixed acquisition
//! order: **token < delegation < proposal/vote < treasury**.
//! `tokio::sync::RwLock` matches the prior runtime's own lock choice (see
//! `ml::ml_monitoring::MLMonitoringSystem`, which already wraps its maps in
//! `Arc<tokio::sync::RwLock<_>>>`), generalized here to the governance
//! sub-states. The block applier takes all four locks, in this order, for
//! the whole apply loop, so readers see all-or-nothing per-block effects;
//! any other caller takes only the locks it needs, in the same order, to
//! avoid deadlock.

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::delegation::DelegationGraph;
use crate::token::TokenLedger;

use super::proposal::ProposalRegistry;
use super::treasury::TreasuryState;
use super::vote::VoteStore;

/// A held write guard over every sub-state, in fixed acquisition order.
/// Dropping this releases all four locks in reverse order automatically.
pub struct StateWriteGuard<'a> {
    pub token: RwLockWriteGuard<'a, TokenLedger>,
    pub delegation: RwLockWriteGuard<'a, DelegationGraph>,
    pub proposals: RwLockWriteGuard<'a, ProposalRegistry>,
    pub votes: RwLockWriteGuard<'a, VoteStore>,
    pub treasury: RwLockWriteGuard<'a, TreasuryState>,
}

/// A held read guard over every sub-state, in the same fixed order.
pub struct StateReadGuard<'a> {
    pub token: RwLockReadGuard<'a, TokenLedger>,
    pub delegation: RwLockReadGuard<'a, DelegationGraph>,
    pub proposals: RwLockReadGuard<'a, ProposalRegistry>,
    pub votes: RwLockReadGuard<'a, VoteStore>,
    pub treasury: RwLockReadGuard<'a, TreasuryState>,
}

#[derive(Clone)]
pub struct GovernanceState {
    token: Arc<RwLock<TokenLedger>>,
    delegation: Arc<RwLock<DelegationGraph>>,
    proposals: Arc<RwLock<ProposalRegistry>>,
    votes: Arc<RwLock<VoteStore>>,
    treasury: Arc<RwLock<TreasuryState>>,
}

impl GovernanceState {
    pub fn new() -> Self {
        Self {
            token: Arc::new(RwLock::new(TokenLedger::new())),
            delegation: Arc::new(RwLock::new(DelegationGraph::new())),
            proposals: Arc::new(RwLock::new(ProposalRegistry::new())),
            votes: Arc::new(RwLock::new(VoteStore::new())),
            treasury: Arc::new(RwLock::new(TreasuryState::new())),
        }
    }

    /// Acquires every sub-state for writing, in the fixed order, for the
    /// duration of a block's apply loop.
    pub async fn write_all(&self) -> StateWriteGuard<'_> {
        let token = self.token.write().await;
        let delegation = self.delegation.write().await;
        let proposals = self.proposals.write().await;
        let votes = self.votes.write().await;
        let treasury = self.treasury.write().await;
        StateWriteGuard {
            token,
            delegation,
            proposals,
            votes,
            treasury,
        }
    }

    /// Acquires every sub-state for reading, in the fixed order, for a
    /// consistent snapshot across getters that span sub-states (e.g.
    /// governance stats).
    pub async fn read_all(&self) -> StateReadGuard<'_> {
        let token = self.token.read().await;
        let delegation = self.delegation.read().await;
        let proposals = self.proposals.read().await;
        let votes = self.votes.read().await;
        let treasury = self.treasury.read().await;
        StateReadGuard {
            token,
            delegation,
            proposals,
            votes,
            treasury,
        }
    }

    pub fn token(&self) -> &Arc<RwLock<TokenLedger>> {
        &self.token
    }

    pub fn delegation(&self) -> &Arc<RwLock<DelegationGraph>> {
        &self.delegation
    }

    pub fn proposals(&self) -> &Arc<RwLock<ProposalRegistry>> {
        &self.proposals
    }

    pub fn votes(&self) -> &Arc<RwLock<VoteStore>> {
        &self.votes
    }

    pub fn treasury(&self) -> &Arc<RwLock<TreasuryState>> {
        &self.treasury
    }
}

impl Default for GovernanceState {
    fn default() -> Self {
        Self::new()
    }
}
