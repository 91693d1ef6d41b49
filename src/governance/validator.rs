//! The pure DAO validator: per-transaction-kind preconditions with no
//! mutation.
//!
//! Grounded on the prior runtime's `advanced_governance::validate_transaction`
//! shape (a pure function consulted before a processor mutates state), but
//! split one function per transaction kind rather than one large match, so
//! the processor can call the exact check it needs and reuse its result
//! (e.g. `validate_cast_vote` returns the resolved vote weight the
//! processor then records, instead of recomputing it).

use crate::config::GovernanceConfig;
use crate::delegation::DelegationGraph;
use crate::ids::{Address, Hash};
use crate::token::{LedgerError, TokenLedger};

use super::error::{GovernanceError, ValidationError};
use super::proposal::{NewProposal, ProposalError, ProposalRegistry, ProposalStatus};
use super::tally::{resolve_vote_weight, ResolvedVote, VotePowerInputs};
use super::treasury::{TreasuryError, TreasuryState};
use super::vote::{VoteChoice, VoteStore};

pub struct DaoValidator;

impl DaoValidator {
    pub fn validate_create_proposal(
        ledger: &TokenLedger,
        config: &GovernanceConfig,
        creator: &Address,
        new: &NewProposal,
    ) -> Result<(), GovernanceError> {
        let balance = ledger.balance(creator);
        if balance < config.fees.proposal {
            return Err(LedgerError::InsufficientTokens {
                required: config.fees.proposal,
                available: balance,
            }
            .into());
        }
        if balance < config.min_proposal_threshold {
            return Err(ValidationError::BelowProposalThreshold.into());
        }
        if new.title.trim().is_empty() {
            return Err(ProposalError::EmptyTitle.into());
        }
        if new.start_time >= new.end_time {
            return Err(ProposalError::InvalidTimeframe {
                start: new.start_time,
                end: new.end_time,
            }
            .into());
        }
        if new.threshold == 0 {
            return Err(ProposalError::InvalidThreshold.into());
        }
        Ok(())
    }

    /// Checks every precondition for a cast vote and resolves the
    /// effective weight and token cost the processor will apply, so the
    /// two layers of validation never disagree about the number they're
    /// checking.
    #[allow(clippy::too_many_arguments)]
    pub fn validate_cast_vote(
        ledger: &TokenLedger,
        delegation: &DelegationGraph,
        proposals: &ProposalRegistry,
        votes: &VoteStore,
        config: &GovernanceConfig,
        proposal_id: &Hash,
        voter: &Address,
        choice: VoteChoice,
        requested_weight: u64,
        now: i64,
    ) -> Result<ResolvedVote, GovernanceError> {
        let proposal = proposals
            .get(proposal_id)
            .ok_or(ProposalError::ProposalNotFound)?;
        if proposal.status != ProposalStatus::Active
            || now < proposal.start_time
            || now > proposal.end_time
        {
            return Err(ValidationError::VotingNotOpen.into());
        }
        if votes.has_voted(proposal_id, voter) {
            return Err(super::vote::VoteStoreError::DuplicateVote.into());
        }
        let _ = choice; // choice itself is already a closed enum; nothing further to validate.
        let fee = config.fees.vote;
        if ledger.balance(voter) < fee {
            return Err(LedgerError::InsufficientTokens {
                required: fee,
                available: ledger.balance(voter),
            }
            .into());
        }
        let effective_power = delegation.resolve_effective_power(voter, now, ledger);
        let inputs = VotePowerInputs {
            balance: ledger.balance(voter),
            effective_power,
            reputation: ledger.reputation(voter),
        };
        let resolved = resolve_vote_weight(proposal.voting_type, requested_weight, &inputs)?;
        Ok(resolved)
    }

    pub fn validate_delegation(
        delegation: &DelegationGraph,
        ledger: &TokenLedger,
        config: &GovernanceConfig,
        delegator: &Address,
        duration_seconds: i64,
        revoke: bool,
    ) -> Result<(), GovernanceError> {
        let fee = config.fees.delegation;
        if ledger.balance(delegator) < fee {
            return Err(LedgerError::InsufficientTokens {
                required: fee,
                available: ledger.balance(delegator),
            }
            .into());
        }
        if revoke {
            if delegation.get(delegator).is_none() {
                return Err(ValidationError::NoActiveDelegation.into());
            }
        } else if duration_seconds <= 0 {
            return Err(ValidationError::InvalidDelegationDuration.into());
        }
        Ok(())
    }

    pub fn validate_treasury_create(
        treasury: &TreasuryState,
        creator: &Address,
        amount: u64,
    ) -> Result<(), GovernanceError> {
        if !treasury.signers.contains(creator) {
            return Err(TreasuryError::NotASigner.into());
        }
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount.into());
        }
        if treasury.balance < amount {
            return Err(TreasuryError::InsufficientFunds {
                required: amount,
                available: treasury.balance,
            }
            .into());
        }
        Ok(())
    }

    pub fn validate_treasury_sign(
        treasury: &TreasuryState,
        tx_id: &Hash,
        signer: &Address,
        now: i64,
    ) -> Result<(), GovernanceError> {
        if !treasury.signers.contains(signer) {
            return Err(TreasuryError::NotASigner.into());
        }
        let pending = treasury
            .get_pending(tx_id)
            .ok_or(TreasuryError::PendingTxNotFound)?;
        if now > pending.expires_at {
            return Err(TreasuryError::Expired.into());
        }
        if pending.signatures.contains(signer) {
            return Err(TreasuryError::DuplicateSignature.into());
        }
        Ok(())
    }

    pub fn validate_token_transfer(
        ledger: &TokenLedger,
        from: &Address,
        amount: u64,
        fee: u64,
    ) -> Result<(), GovernanceError> {
        let required = amount.saturating_add(fee);
        let available = ledger.balance(from);
        if available < required {
            return Err(LedgerError::InsufficientTokens {
                required,
                available,
            }
            .into());
        }
        Ok(())
    }

    pub fn validate_token_transfer_from(
        ledger: &TokenLedger,
        spender: &Address,
        owner: &Address,
        amount: u64,
        fee: u64,
    ) -> Result<(), GovernanceError> {
        let allowed = ledger.get_allowance(owner, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowed,
            }
            .into());
        }
        if ledger.balance(owner) < amount {
            return Err(LedgerError::InsufficientTokens {
                required: amount,
                available: ledger.balance(owner),
            }
            .into());
        }
        if ledger.balance(spender) < fee {
            return Err(LedgerError::InsufficientTokens {
                required: fee,
                available: ledger.balance(spender),
            }
            .into());
        }
        Ok(())
    }

    pub fn validate_token_burn(
        ledger: &TokenLedger,
        from: &Address,
        amount: u64,
        fee: u64,
    ) -> Result<(), GovernanceError> {
        let required = amount.saturating_add(fee);
        let available = ledger.balance(from);
        if available < required {
            return Err(LedgerError::InsufficientTokens {
                required,
                available,
            }
            .into());
        }
        Ok(())
    }
}
