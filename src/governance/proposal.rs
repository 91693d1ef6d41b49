//! Proposal records and their registry.
//!
//! `ProposalType`, `VotingType`, `ProposalStatus` and `VoteResults` are
//! closed enums/structs rather than the prior runtime's free-form
//! `ProposalType`/`ProposalState` in `advanced_governance.rs` (which mixes
//! in concerns like `Emergency`/`CrossChain` this governance model has no
//! use for); the state-transition discipline (monotonic, no
//! back-transitions) is new relative to the prior runtime, which let
//! `update_proposal_state` overwrite state unconditionally.

use crate::ids::{Address, Hash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalType {
    General,
    Treasury,
    Technical,
    Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingType {
    Simple,
    Quadratic,
    Weighted,
    Reputation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Active,
    Passed,
    Rejected,
    Executed,
    Cancelled,
}

impl ProposalStatus {
    /// Enforces the monotonic DAG
    /// `Pending -> Active -> (Passed|Rejected) -> Executed|Cancelled`.
    /// Cancellation is allowed from any non-terminal state.
    fn can_transition_to(self, next: ProposalStatus) -> bool {
        use ProposalStatus::*;
        match (self, next) {
            (Pending, Active) => true,
            (Active, Passed) | (Active, Rejected) => true,
            (Passed, Executed) => true,
            (Pending, Cancelled) | (Active, Cancelled) | (Passed, Cancelled) => true,
            _ => false,
        }
    }
}

/// The recipient/amount a `Treasury`-typed proposal schedules once it is
/// executed. `None` for every other proposal type; `ProposalRegistry::create`
/// enforces that the two are never mismatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryPayout {
    pub recipient: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VoteResults {
    pub yes_votes: u64,
    pub no_votes: u64,
    pub abstain_votes: u64,
    pub total_voters: u64,
    pub quorum: u64,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Hash,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub proposal_type: ProposalType,
    pub voting_type: VotingType,
    pub start_time: i64,
    pub end_time: i64,
    pub status: ProposalStatus,
    pub threshold: u64,
    pub results: VoteResults,
    pub metadata_hash: Hash,
    pub treasury_payout: Option<TreasuryPayout>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("proposal title must not be empty")]
    EmptyTitle,
    #[error("invalid timeframe: start {start} must be before end {end}")]
    InvalidTimeframe { start: i64, end: i64 },
    #[error("threshold must be nonzero")]
    InvalidThreshold,
    #[error("duplicate proposal id")]
    DuplicateProposal,
    #[error("proposal not found")]
    ProposalNotFound,
    #[error("illegal proposal status transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: ProposalStatus,
        to: ProposalStatus,
    },
    #[error("a Treasury proposal must carry a nonzero recipient/amount payout")]
    MissingTreasuryPayout,
    #[error("only a Treasury proposal may carry a recipient/amount payout")]
    UnexpectedTreasuryPayout,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub id: Hash,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub proposal_type: ProposalType,
    pub voting_type: VotingType,
    pub start_time: i64,
    pub end_time: i64,
    pub threshold: u64,
    pub metadata_hash: Hash,
    pub treasury_payout: Option<TreasuryPayout>,
}

/// `proposalId -> Proposal`, one owner of the status-transition discipline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProposalRegistry {
    proposals: HashMap<Hash, Proposal>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Hash) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn get_mut(&mut self, id: &Hash) -> Option<&mut Proposal> {
        self.proposals.get_mut(id)
    }

    pub fn list(&self) -> Vec<Proposal> {
        self.proposals.values().cloned().collect()
    }

    pub fn create(&mut self, new: NewProposal, now: i64) -> Result<Hash, ProposalError> {
        if new.title.trim().is_empty() {
            return Err(ProposalError::EmptyTitle);
        }
        if new.start_time >= new.end_time {
            return Err(ProposalError::InvalidTimeframe {
                start: new.start_time,
                end: new.end_time,
            });
        }
        if new.threshold == 0 {
            return Err(ProposalError::InvalidThreshold);
        }
        if self.proposals.contains_key(&new.id) {
            return Err(ProposalError::DuplicateProposal);
        }
        match (new.proposal_type, new.treasury_payout) {
            (ProposalType::Treasury, None) => return Err(ProposalError::MissingTreasuryPayout),
            (ProposalType::Treasury, Some(payout)) if payout.amount == 0 => {
                return Err(ProposalError::MissingTreasuryPayout)
            }
            (ProposalType::Treasury, Some(_)) => {}
            (_, None) => {}
            (_, Some(_)) => return Err(ProposalError::UnexpectedTreasuryPayout),
        }

        let status = if new.start_time > now {
            ProposalStatus::Pending
        } else {
            ProposalStatus::Active
        };

        let proposal = Proposal {
            id: new.id,
            creator: new.creator,
            title: new.title,
            description: new.description,
            proposal_type: new.proposal_type,
            voting_type: new.voting_type,
            start_time: new.start_time,
            end_time: new.end_time,
            status,
            threshold: new.threshold,
            results: VoteResults::default(),
            metadata_hash: new.metadata_hash,
            treasury_payout: new.treasury_payout,
        };
        self.proposals.insert(new.id, proposal);
        Ok(new.id)
    }

    /// Applies a status transition, enforcing the monotonic DAG.
    pub fn transition(
        &mut self,
        id: &Hash,
        next: ProposalStatus,
    ) -> Result<(), ProposalError> {
        let proposal = self
            .proposals
            .get_mut(id)
            .ok_or(ProposalError::ProposalNotFound)?;
        if !proposal.status.can_transition_to(next) {
            return Err(ProposalError::IllegalTransition {
                from: proposal.status,
                to: next,
            });
        }
        proposal.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    fn sample(id: u8, start: i64, end: i64) -> NewProposal {
        NewProposal {
            id: Hash([id; 32]),
            creator: addr(1),
            title: "Title".into(),
            description: "Description".into(),
            proposal_type: ProposalType::General,
            voting_type: VotingType::Simple,
            start_time: start,
            end_time: end,
            threshold: 5100,
            metadata_hash: Hash::ZERO,
            treasury_payout: None,
        }
    }

    #[test]
    fn treasury_proposal_without_payout_rejected() {
        let mut reg = ProposalRegistry::new();
        let mut p = sample(1, 0, 100);
        p.proposal_type = ProposalType::Treasury;
        assert_eq!(reg.create(p, 0), Err(ProposalError::MissingTreasuryPayout));
    }

    #[test]
    fn non_treasury_proposal_with_payout_rejected() {
        let mut reg = ProposalRegistry::new();
        let mut p = sample(1, 0, 100);
        p.treasury_payout = Some(TreasuryPayout { recipient: addr(2), amount: 100 });
        assert_eq!(reg.create(p, 0), Err(ProposalError::UnexpectedTreasuryPayout));
    }

    #[test]
    fn treasury_proposal_with_payout_stores_it() {
        let mut reg = ProposalRegistry::new();
        let mut p = sample(1, 0, 100);
        p.proposal_type = ProposalType::Treasury;
        p.treasury_payout = Some(TreasuryPayout { recipient: addr(2), amount: 100 });
        let id = reg.create(p, 0).unwrap();
        assert_eq!(
            reg.get(&id).unwrap().treasury_payout,
            Some(TreasuryPayout { recipient: addr(2), amount: 100 })
        );
    }

    #[test]
    fn empty_title_rejected() {
        let mut reg = ProposalRegistry::new();
        let mut p = sample(1, 0, 100);
        p.title = "   ".into();
        assert_eq!(reg.create(p, 0), Err(ProposalError::EmptyTitle));
    }

    #[test]
    fn start_must_precede_end() {
        let mut reg = ProposalRegistry::new();
        assert_eq!(
            reg.create(sample(1, 100, 100), 0),
            Err(ProposalError::InvalidTimeframe { start: 100, end: 100 })
        );
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut reg = ProposalRegistry::new();
        reg.create(sample(1, 0, 100), 0).unwrap();
        assert_eq!(
            reg.create(sample(1, 0, 100), 0),
            Err(ProposalError::DuplicateProposal)
        );
    }

    #[test]
    fn starts_active_when_window_already_open() {
        let mut reg = ProposalRegistry::new();
        let id = reg.create(sample(1, 0, 100), 50).unwrap();
        assert_eq!(reg.get(&id).unwrap().status, ProposalStatus::Active);
    }

    #[test]
    fn starts_pending_when_window_in_future() {
        let mut reg = ProposalRegistry::new();
        let id = reg.create(sample(1, 100, 200), 0).unwrap();
        assert_eq!(reg.get(&id).unwrap().status, ProposalStatus::Pending);
    }

    #[test]
    fn status_transitions_are_monotonic() {
        let mut reg = ProposalRegistry::new();
        let id = reg.create(sample(1, 0, 100), 0).unwrap();
        reg.transition(&id, ProposalStatus::Passed).unwrap();
        assert_eq!(
            reg.transition(&id, ProposalStatus::Active),
            Err(ProposalError::IllegalTransition {
                from: ProposalStatus::Passed,
                to: ProposalStatus::Active
            })
        );
        reg.transition(&id, ProposalStatus::Executed).unwrap();
        assert_eq!(reg.get(&id).unwrap().status, ProposalStatus::Executed);
    }
}
