//! The voting tally engine: maps `(voting_type, requested_weight, voter,
//! proposal)` to an effective weight and a token cost.
//!
//! Grounded on the prior runtime's `advanced_governance::calculate_voting_power`,
//! which already distinguishes `TokenWeighted`/`Quadratic`/
//! `ReputationWeighted`/`Hybrid` mechanisms; this reshapes that into four
//! mechanisms (`Simple`/`Quadratic`/`Weighted`/`Reputation`) and adds the
//! token-cost side the prior runtime's version never computed (the prior
//! runtime's quadratic path took `sqrt(balance)` as voting power but
//! never debited `requested^2` tokens).

use super::proposal::{Proposal, VoteResults, VotingType};
use super::vote::VoteChoice;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TallyError {
    #[error("insufficient tokens for vote: required {required}, available {available}")]
    InsufficientTokensForVote { required: u64, available: u64 },
}

/// Per-mechanism precondition inputs a validator/processor needs to check
/// before accepting a vote.
pub struct VotePowerInputs {
    pub balance: u64,
    pub effective_power: u64,
    pub reputation: u64,
}

/// The result of resolving a cast vote: how much weight the tally counts,
/// and how many tokens (beyond the flat per-vote fee) the processor must
/// debit from the voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVote {
    pub effective_weight: u64,
    pub token_cost: u64,
}

/// Resolves `requested_weight` against `voting_type` and the voter's
/// current on-chain standing.
pub fn resolve_vote_weight(
    voting_type: VotingType,
    requested_weight: u64,
    inputs: &VotePowerInputs,
) -> Result<ResolvedVote, TallyError> {
    match voting_type {
        VotingType::Simple => {
            if inputs.balance < requested_weight {
                return Err(TallyError::InsufficientTokensForVote {
                    required: requested_weight,
                    available: inputs.balance,
                });
            }
            Ok(ResolvedVote {
                effective_weight: requested_weight.min(inputs.balance),
                token_cost: 0,
            })
        }
        VotingType::Quadratic => {
            let cost = requested_weight.saturating_mul(requested_weight);
            if inputs.balance < cost {
                return Err(TallyError::InsufficientTokensForVote {
                    required: cost,
                    available: inputs.balance,
                });
            }
            Ok(ResolvedVote {
                effective_weight: requested_weight,
                token_cost: cost,
            })
        }
        VotingType::Weighted => {
            if inputs.effective_power < requested_weight {
                return Err(TallyError::InsufficientTokensForVote {
                    required: requested_weight,
                    available: inputs.effective_power,
                });
            }
            Ok(ResolvedVote {
                effective_weight: requested_weight.min(inputs.effective_power),
                token_cost: 0,
            })
        }
        VotingType::Reputation => {
            if inputs.reputation < requested_weight {
                return Err(TallyError::InsufficientTokensForVote {
                    required: requested_weight,
                    available: inputs.reputation,
                });
            }
            Ok(ResolvedVote {
                effective_weight: requested_weight.min(inputs.reputation),
                token_cost: 0,
            })
        }
    }
}

/// Folds a resolved vote's effective weight into the running tally.
pub fn apply_weight_to_results(results: &mut VoteResults, choice: VoteChoice, weight: u64) {
    match choice {
        VoteChoice::Yes => results.yes_votes += weight,
        VoteChoice::No => results.no_votes += weight,
        VoteChoice::Abstain => results.abstain_votes += weight,
    }
    results.quorum = results.yes_votes + results.no_votes + results.abstain_votes;
    results.total_voters += 1;
}

/// Finalizes a proposal's results at the end of its voting window:
/// quorum then approval-ratio in basis points, nonzero denominator
/// required.
pub fn finalize(
    proposal: &Proposal,
    quorum_threshold: u64,
    passing_threshold_bps: u32,
) -> VoteResults {
    let mut results = proposal.results;
    let quorum_met = results.quorum >= quorum_threshold;
    let denom = results.yes_votes + results.no_votes;
    let approved = quorum_met
        && denom > 0
        && (results.yes_votes as u128 * 10_000) / (denom as u128) >= passing_threshold_bps as u128;
    results.passed = approved;
    results
}
