//! The aggregated governance error type.
//!
//! Mirrors the shape of the prior runtime's `advanced_governance::GovernanceError`,
//! which already aggregates blockchain/ledger/contract failures behind one
//! enum at the facade boundary — except the prior runtime wraps them as bare
//! `String` variants produced by `format!`. Here every sub-error keeps its
//! own typed variant set and is lifted with `#[from]`, so a caller matching
//! on `GovernanceError` gets the concrete failure, not a formatted string.

use crate::token::LedgerError;
use thiserror::Error;

use super::proposal::ProposalError;
use super::tally::TallyError;
use super::treasury::TreasuryError;
use super::vote::VoteStoreError;

/// Failures that belong to no single sub-state but arise from
/// cross-cutting preconditions the validator enforces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("proposal is not currently accepting votes")]
    VotingNotOpen,
    #[error("delegation duration must be positive")]
    InvalidDelegationDuration,
    #[error("no delegation record exists to revoke")]
    NoActiveDelegation,
    #[error("creator does not meet the minimum proposal threshold")]
    BelowProposalThreshold,
    #[error("vote choice is not one of Yes, No, Abstain")]
    InvalidVoteChoice,
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("caller is not authorized for this operation")]
    Unauthorized,
    #[error("VM operand stack overflow")]
    StackOverflow,
    #[error("VM operand stack underflow")]
    StackUnderflow,
    #[error("VM encountered a malformed operand")]
    InvalidOperand,
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Proposal(#[from] ProposalError),
    #[error(transparent)]
    Vote(#[from] VoteStoreError),
    #[error(transparent)]
    Tally(#[from] TallyError),
    #[error(transparent)]
    Treasury(#[from] TreasuryError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
