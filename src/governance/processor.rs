//! The effectful DAO processor.
//!
//! Each method re-runs the matching `DaoValidator` check (defense in
//! depth), debits the fixed fee from the caller, applies the mutation to
//! the already-held write guard, and emits a typed event. A failing method
//! returns before touching any sub-state it would otherwise mutate, so a
//! rejected transaction never leaves partial effects — the prior runtime's
//! `advanced_governance::GovernanceBlockchainBridge::process_transaction`
//! follows the same "validate then apply in one pass" shape; this splits
//! it one method per transaction kind so the block applier can dispatch on
//! `TxType` directly.

use crate::config::GovernanceConfig;
use crate::ids::{Address, Hash};
use crate::signing::SigningBackend;

use super::error::{GovernanceError, ValidationError};
use super::events::{EventSink, GovernanceEvent};
use super::proposal::{NewProposal, ProposalError, ProposalStatus, ProposalType};
use super::state::StateWriteGuard;
use super::tally::apply_weight_to_results;
use super::treasury::TreasuryError;
use super::validator::DaoValidator;
use super::vote::{Vote, VoteChoice};

pub struct DaoProcessor;

/// Builds the deterministic message a treasury signature is taken over;
/// including `id` prevents replaying a signer's signature across two
/// different pending transactions.
pub fn treasury_sign_message(id: &Hash, recipient: &Address, amount: u64, purpose: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 + 20 + 8 + purpose.len());
    buf.extend_from_slice(&id.0);
    buf.extend_from_slice(&recipient.0);
    buf.extend_from_slice(&amount.to_be_bytes());
    buf.extend_from_slice(purpose.as_bytes());
    buf
}

impl DaoProcessor {
    pub fn create_proposal(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        new: NewProposal,
        now: i64,
    ) -> Result<Hash, GovernanceError> {
        DaoValidator::validate_create_proposal(&state.token, config, &new.creator, &new)?;
        let creator = new.creator;
        let fee = config.fees.proposal;
        state.token.burn(&creator, fee, now)?;
        let id = state.proposals.create(new, now)?;
        events.emit(GovernanceEvent::ProposalCreated { id, creator });
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn cast_vote(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        proposal_id: Hash,
        voter: Address,
        choice: VoteChoice,
        requested_weight: u64,
        reason: Option<String>,
        now: i64,
    ) -> Result<(), GovernanceError> {
        let resolved = DaoValidator::validate_cast_vote(
            &state.token,
            &state.delegation,
            &state.proposals,
            &state.votes,
            config,
            &proposal_id,
            &voter,
            choice,
            requested_weight,
            now,
        )?;

        let fee = config.fees.vote;
        let total_debit = fee.saturating_add(resolved.token_cost);
        state.token.burn(&voter, total_debit, now)?;

        state.votes.record(
            proposal_id,
            Vote {
                voter,
                choice,
                weight: resolved.effective_weight,
                timestamp: now,
                reason,
            },
        )?;

        let proposal = state
            .proposals
            .get_mut(&proposal_id)
            .ok_or(super::proposal::ProposalError::ProposalNotFound)?;
        apply_weight_to_results(&mut proposal.results, choice, resolved.effective_weight);

        events.emit(GovernanceEvent::VoteCast {
            proposal_id,
            voter,
            weight: resolved.effective_weight,
        });
        Ok(())
    }

    pub fn delegate(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        delegator: Address,
        delegate: Address,
        duration_seconds: i64,
        revoke: bool,
        now: i64,
    ) -> Result<(), GovernanceError> {
        DaoValidator::validate_delegation(
            &state.delegation,
            &state.token,
            config,
            &delegator,
            duration_seconds,
            revoke,
        )?;
        state.token.burn(&delegator, config.fees.delegation, now)?;

        if revoke {
            state.delegation.revoke(&delegator);
            events.emit(GovernanceEvent::DelegationChanged {
                delegator,
                delegate: None,
            });
        } else {
            state.delegation.delegate(delegator, delegate, now, duration_seconds);
            events.emit(GovernanceEvent::DelegationChanged {
                delegator,
                delegate: Some(delegate),
            });
        }
        Ok(())
    }

    pub fn treasury_create(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        id: Hash,
        creator: Address,
        recipient: Address,
        amount: u64,
        purpose: String,
        now: i64,
    ) -> Result<(), GovernanceError> {
        DaoValidator::validate_treasury_create(&state.treasury, &creator, amount)?;
        state.token.burn(&creator, config.fees.treasury_create, now)?;
        state.treasury.create_pending(
            id,
            recipient,
            amount,
            purpose,
            now,
            config.pending_tx_ttl_seconds,
        )?;
        events.emit(GovernanceEvent::TreasuryTxCreated { id, recipient, amount });
        Ok(())
    }

    /// Verifies `sig_bytes` against the deterministic treasury message
    /// before recording the signature, so a forged signer byte string
    /// alone cannot count toward the multi-sig threshold.
    pub fn treasury_sign(
        state: &mut StateWriteGuard<'_>,
        signing: &dyn SigningBackend,
        events: &EventSink,
        tx_id: Hash,
        signer: Address,
        sig_bytes: &[u8],
        now: i64,
    ) -> Result<(), GovernanceError> {
        DaoValidator::validate_treasury_sign(&state.treasury, &tx_id, &signer, now)?;
        let pending = state
            .treasury
            .get_pending(&tx_id)
            .ok_or(TreasuryError::PendingTxNotFound)?;
        let message = treasury_sign_message(&tx_id, &pending.recipient, pending.amount, &pending.purpose);
        if !signing.verify(&signer.0, &message, sig_bytes) {
            return Err(ValidationError::InvalidSignature.into());
        }
        state.treasury.sign(&tx_id, signer, now)?;
        events.emit(GovernanceEvent::TreasuryTxSigned { id: tx_id, signer });
        Ok(())
    }

    pub fn treasury_execute(
        state: &mut StateWriteGuard<'_>,
        events: &EventSink,
        tx_id: Hash,
        now: i64,
    ) -> Result<(), GovernanceError> {
        let (recipient, amount) = state.treasury.execute(&tx_id, now)?;
        state.token.mint(&recipient, amount, now)?;
        events.emit(GovernanceEvent::TreasuryTxExecuted { id: tx_id, recipient, amount });
        Ok(())
    }

    /// Finalizes a Passed proposal into its `proposalType`-specific
    /// effect. A `Treasury` proposal schedules its pending disbursement
    /// (using its own id as the `PendingTx` id, so the two are linked
    /// one-to-one) before the status transition commits, so a treasury
    /// failure — insufficient funds, say — leaves the proposal Passed and
    /// retryable rather than silently Executed with no effect. `Parameter`
    /// proposals carry no payout and fall through to a plain status
    /// transition; the config mutation itself is applied by the caller
    /// that owns the live `GovernanceConfig` (see `DESIGN.md`). `General`
    /// and `Technical` proposals just record the decision.
    pub fn execute_proposal(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        id: Hash,
        now: i64,
    ) -> Result<(), GovernanceError> {
        let proposal = state
            .proposals
            .get(&id)
            .ok_or(ProposalError::ProposalNotFound)?;

        if proposal.proposal_type == ProposalType::Treasury {
            let payout = proposal.treasury_payout.ok_or(ProposalError::MissingTreasuryPayout)?;
            let purpose = proposal.title.clone();
            state.treasury.create_pending(
                id,
                payout.recipient,
                payout.amount,
                purpose,
                now,
                config.pending_tx_ttl_seconds,
            )?;
            state.proposals.transition(&id, ProposalStatus::Executed)?;
            events.emit(GovernanceEvent::TreasuryTxCreated {
                id,
                recipient: payout.recipient,
                amount: payout.amount,
            });
        } else {
            state.proposals.transition(&id, ProposalStatus::Executed)?;
        }

        events.emit(GovernanceEvent::ProposalExecuted { id });
        Ok(())
    }

    pub fn mint(
        state: &mut StateWriteGuard<'_>,
        events: &EventSink,
        to: Address,
        amount: u64,
        now: i64,
    ) -> Result<(), GovernanceError> {
        state.token.mint(&to, amount, now)?;
        events.emit(GovernanceEvent::TokenTransferred {
            from: to,
            to,
            amount,
        });
        Ok(())
    }

    pub fn burn(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        from: Address,
        amount: u64,
        now: i64,
    ) -> Result<(), GovernanceError> {
        DaoValidator::validate_token_burn(&state.token, &from, amount, config.fees.token_op)?;
        state.token.burn(&from, amount.saturating_add(config.fees.token_op), now)?;
        events.emit(GovernanceEvent::TokenTransferred { from, to: from, amount });
        Ok(())
    }

    pub fn transfer(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        from: Address,
        to: Address,
        amount: u64,
        now: i64,
    ) -> Result<(), GovernanceError> {
        let fee = config.fees.token_op;
        DaoValidator::validate_token_transfer(&state.token, &from, amount, fee)?;
        state.token.burn(&from, fee, now)?;
        state.token.transfer(&from, &to, amount, now)?;
        events.emit(GovernanceEvent::TokenTransferred { from, to, amount });
        Ok(())
    }

    pub fn approve(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        owner: Address,
        spender: Address,
        amount: u64,
        now: i64,
    ) -> Result<(), GovernanceError> {
        state.token.burn(&owner, config.fees.token_op, now)?;
        state.token.approve(&owner, &spender, amount, now);
        Ok(())
    }

    pub fn transfer_from(
        state: &mut StateWriteGuard<'_>,
        config: &GovernanceConfig,
        events: &EventSink,
        spender: Address,
        owner: Address,
        to: Address,
        amount: u64,
        now: i64,
    ) -> Result<(), GovernanceError> {
        let fee = config.fees.token_op;
        DaoValidator::validate_token_transfer_from(&state.token, &spender, &owner, amount, fee)?;
        state.token.burn(&spender, fee, now)?;
        state.token.transfer_from(&spender, &owner, &to, amount, now)?;
        events.emit(GovernanceEvent::TokenTransferred { from: owner, to, amount });
        Ok(())
    }
}
