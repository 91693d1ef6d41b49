//! Vote records and the per-proposal vote store.
//!
//! Grounded on the prior runtime's `advanced_governance::Vote`/`VoteChoice`
//! (`voter`, `choice`, timestamp, optional reason), trimmed to a single
//! `weight` field (the *effective* weight the tally engine counted, not
//! the prior runtime's separate `voting_power`/
//! `quadratic_power`/`reputation_power` fields — those were mechanism
//! leakage into the record; the tally engine already resolves down to one
//! number before the vote is stored).

use crate::ids::{Address, Hash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub voter: Address,
    pub choice: VoteChoice,
    pub weight: u64,
    pub timestamp: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteStoreError {
    #[error("voter has already voted on this proposal")]
    DuplicateVote,
}

/// `proposalId -> (voterAddress -> Vote)`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoteStore {
    votes: HashMap<Hash, HashMap<Address, Vote>>,
}

impl VoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, proposal_id: &Hash, voter: &Address) -> bool {
        self.votes
            .get(proposal_id)
            .map(|m| m.contains_key(voter))
            .unwrap_or(false)
    }

    pub fn record(&mut self, proposal_id: Hash, vote: Vote) -> Result<(), VoteStoreError> {
        let voter_map = self.votes.entry(proposal_id).or_default();
        if voter_map.contains_key(&vote.voter) {
            return Err(VoteStoreError::DuplicateVote);
        }
        voter_map.insert(vote.voter, vote);
        Ok(())
    }

    pub fn get_votes(&self, proposal_id: &Hash) -> Vec<Vote> {
        self.votes
            .get(proposal_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }
}
