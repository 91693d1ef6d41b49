//! The stack-oriented governance VM interpreter.
//!
//! Grounded on the prior runtime's `instruction.rs`/`vm.rs` pair (an opcode enum
//! plus a `Vec`-backed operand stack with a fixed capacity check before
//! every push) generalized from ML-tensor opcodes to governance opcodes.
//! The interpreter borrows a live `StateWriteGuard` for its whole run
//! rather than re-acquiring locks per opcode: a contract program is just
//! more work done inside the block applier's single write section, held
//! for its entire duration.

use serde::Serialize;

use crate::config::GovernanceConfig;
use crate::ids::{Address, Hash};
use crate::signing::SigningBackend;

use super::super::error::{GovernanceError, ValidationError};
use super::super::events::EventSink;
use super::super::processor::{treasury_sign_message, DaoProcessor};
use super::super::proposal::{NewProposal, ProposalStatus, ProposalType, VotingType};
use super::super::state::StateWriteGuard;
use super::super::tally::{finalize, resolve_vote_weight, VotePowerInputs};
use super::super::treasury::TreasuryError;
use super::super::vote::VoteChoice;
use super::opcode::Opcode;
use super::value::Value;

/// Operand stack depth limit, guarding against runaway programs.
pub const STACK_CAPACITY: usize = 128;

/// One entry of a governance program: either push a literal operand, or
/// execute an opcode against whatever is currently on the stack.
#[derive(Debug, Clone)]
pub enum Instruction {
    Push(Value),
    Exec(Opcode),
}

/// Signature bundle entries packed as 32-byte address || 64-byte signature.
const SIG_ENTRY_LEN: usize = 32 + 64;

pub struct Interpreter<'a, 'b> {
    stack: Vec<Value>,
    state: &'a mut StateWriteGuard<'b>,
    config: &'a GovernanceConfig,
    signing: &'a dyn SigningBackend,
    events: &'a EventSink,
    caller: Address,
    now: i64,
}

impl<'a, 'b> Interpreter<'a, 'b> {
    pub fn new(
        state: &'a mut StateWriteGuard<'b>,
        config: &'a GovernanceConfig,
        signing: &'a dyn SigningBackend,
        events: &'a EventSink,
        caller: Address,
        now: i64,
    ) -> Self {
        Self {
            stack: Vec::with_capacity(STACK_CAPACITY),
            state,
            config,
            signing,
            events,
            caller,
            now,
        }
    }

    fn push(&mut self, value: Value) -> Result<(), GovernanceError> {
        if self.stack.len() >= STACK_CAPACITY {
            return Err(ValidationError::StackOverflow.into());
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, GovernanceError> {
        self.stack.pop().ok_or_else(|| ValidationError::StackUnderflow.into())
    }

    /// Runs a full program to completion. A failing opcode aborts the
    /// program immediately; effects already committed by earlier opcodes
    /// remain (sequencing a program to tolerate this is the caller's
    /// obligation).
    pub fn run(&mut self, program: &[Instruction]) -> Result<(), GovernanceError> {
        for instruction in program {
            match instruction {
                Instruction::Push(value) => self.push(value.clone())?,
                Instruction::Exec(opcode) => self.exec(*opcode)?,
            }
        }
        Ok(())
    }

    /// The final value left on the stack, for callers that want the
    /// program's result without inspecting intermediate state.
    pub fn top(&self) -> Option<&Value> {
        self.stack.last()
    }

    fn exec(&mut self, opcode: Opcode) -> Result<(), GovernanceError> {
        match opcode {
            Opcode::CreateProposal => self.op_create_proposal(),
            Opcode::CastVote => self.op_cast_vote(),
            Opcode::Delegate => self.op_delegate(),
            Opcode::CalculateQuorum => self.op_calculate_quorum(),
            Opcode::ExecuteProposal => self.op_execute_proposal(),
            Opcode::QuadraticVote => self.op_quadratic_vote(),
            Opcode::TreasuryTransfer => self.op_treasury_transfer(),
            Opcode::MintTokens => self.op_mint_tokens(),
            Opcode::BurnTokens => self.op_burn_tokens(),
            Opcode::GetProposal => self.op_get_proposal(),
            Opcode::GetVote => self.op_get_vote(),
            Opcode::GetDelegation => self.op_get_delegation(),
        }
    }

    fn decode_proposal_type(code: u64) -> Result<ProposalType, GovernanceError> {
        Ok(match code {
            0 => ProposalType::General,
            1 => ProposalType::Treasury,
            2 => ProposalType::Technical,
            3 => ProposalType::Parameter,
            _ => return Err(ValidationError::InvalidOperand.into()),
        })
    }

    fn decode_voting_type(code: u64) -> Result<VotingType, GovernanceError> {
        Ok(match code {
            0 => VotingType::Simple,
            1 => VotingType::Quadratic,
            2 => VotingType::Weighted,
            3 => VotingType::Reputation,
            _ => return Err(ValidationError::InvalidOperand.into()),
        })
    }

    fn decode_choice(code: u64) -> Result<VoteChoice, GovernanceError> {
        Ok(match code {
            0 => VoteChoice::Yes,
            1 => VoteChoice::No,
            2 => VoteChoice::Abstain,
            _ => return Err(ValidationError::InvalidVoteChoice.into()),
        })
    }

    fn op_create_proposal(&mut self) -> Result<(), GovernanceError> {
        let metadata_hash = self.pop()?.as_hash()?;
        let threshold = self.pop()?.as_u64()?;
        let end_time = self.pop()?.as_i64()?;
        let start_time = self.pop()?.as_i64()?;
        let voting_type = Self::decode_voting_type(self.pop()?.as_u64()?)?;
        let proposal_type = Self::decode_proposal_type(self.pop()?.as_u64()?)?;
        let description = self.pop()?.as_str()?.to_string();
        let title = self.pop()?.as_str()?.to_string();

        let mut seed = Vec::new();
        seed.extend_from_slice(&self.caller.0);
        seed.extend_from_slice(title.as_bytes());
        seed.extend_from_slice(description.as_bytes());
        seed.extend_from_slice(&start_time.to_be_bytes());
        seed.extend_from_slice(&end_time.to_be_bytes());
        seed.extend_from_slice(&metadata_hash.0);
        let id = Hash::of(&seed);

        let new = NewProposal {
            id,
            creator: self.caller,
            title,
            description,
            proposal_type,
            voting_type,
            start_time,
            end_time,
            threshold,
            metadata_hash,
            // The bytecode opcode has no stack slot for a recipient/amount
            // pair, so it can only ever produce non-Treasury proposals;
            // `ProposalRegistry::create` rejects `ProposalType::Treasury`
            // with no payout, which is the correct outcome here.
            treasury_payout: None,
        };
        let created = DaoProcessor::create_proposal(self.state, self.config, self.events, new, self.now)?;
        self.push(Value::Hash(created))
    }

    fn op_cast_vote(&mut self) -> Result<(), GovernanceError> {
        let proposal_id = self.pop()?.as_hash()?;
        let choice = Self::decode_choice(self.pop()?.as_u64()?)?;
        let weight = self.pop()?.as_u64()?;
        let reason_value = self.pop()?;
        let reason = match reason_value {
            Value::Nil => None,
            other => Some(other.as_str()?.to_string()),
        };
        DaoProcessor::cast_vote(
            self.state,
            self.config,
            self.events,
            proposal_id,
            self.caller,
            choice,
            weight,
            reason,
            self.now,
        )?;
        self.push(Value::Bool(true))
    }

    fn op_delegate(&mut self) -> Result<(), GovernanceError> {
        let delegate = self.pop()?.as_optional_address()?;
        let duration = self.pop()?.as_i64()?;
        let revoke = self.pop()?.as_bool()?;
        let delegate_addr = if revoke {
            delegate.unwrap_or(self.caller)
        } else {
            delegate.ok_or(ValidationError::InvalidOperand)?
        };
        DaoProcessor::delegate(
            self.state,
            self.config,
            self.events,
            self.caller,
            delegate_addr,
            duration,
            revoke,
            self.now,
        )?;
        self.push(Value::Bool(true))
    }

    fn op_calculate_quorum(&mut self) -> Result<(), GovernanceError> {
        let proposal_id = self.pop()?.as_hash()?;
        let proposal = self
            .state
            .proposals
            .get(&proposal_id)
            .ok_or(super::super::proposal::ProposalError::ProposalNotFound)?;
        let met = proposal.results.quorum >= self.config.quorum_threshold;
        self.push(Value::Bool(met))
    }

    fn op_execute_proposal(&mut self) -> Result<(), GovernanceError> {
        let proposal_id = self.pop()?.as_hash()?;
        let proposal = self
            .state
            .proposals
            .get(&proposal_id)
            .ok_or(super::super::proposal::ProposalError::ProposalNotFound)?
            .clone();

        let ok = match proposal.status {
            ProposalStatus::Active => {
                let results = finalize(&proposal, self.config.quorum_threshold, self.config.passing_threshold_bps);
                let next = if results.passed {
                    ProposalStatus::Passed
                } else {
                    ProposalStatus::Rejected
                };
                if let Some(stored) = self.state.proposals.get_mut(&proposal_id) {
                    stored.results = results;
                }
                self.state.proposals.transition(&proposal_id, next)?;
                next == ProposalStatus::Passed
            }
            ProposalStatus::Passed => {
                DaoProcessor::execute_proposal(self.state, self.config, self.events, proposal_id, self.now)?;
                true
            }
            _ => false,
        };
        self.push(Value::Bool(ok))
    }

    fn op_quadratic_vote(&mut self) -> Result<(), GovernanceError> {
        let proposal_id = self.pop()?.as_hash()?;
        let choice = Self::decode_choice(self.pop()?.as_u64()?)?;
        let vote_count = self.pop()?.as_u64()?;
        let reason_value = self.pop()?;
        let reason = match reason_value {
            Value::Nil => None,
            other => Some(other.as_str()?.to_string()),
        };

        let proposal = self
            .state
            .proposals
            .get(&proposal_id)
            .ok_or(super::super::proposal::ProposalError::ProposalNotFound)?;
        if proposal.status != ProposalStatus::Active || self.now < proposal.start_time || self.now > proposal.end_time {
            return Err(ValidationError::VotingNotOpen.into());
        }
        if self.state.votes.has_voted(&proposal_id, &self.caller) {
            return Err(super::super::vote::VoteStoreError::DuplicateVote.into());
        }

        let inputs = VotePowerInputs {
            balance: self.state.token.balance(&self.caller),
            effective_power: 0,
            reputation: 0,
        };
        let resolved = resolve_vote_weight(VotingType::Quadratic, vote_count, &inputs)?;
        let total_debit = self.config.fees.vote.saturating_add(resolved.token_cost);
        self.state.token.burn(&self.caller, total_debit, self.now)?;
        self.state.votes.record(
            proposal_id,
            super::super::vote::Vote {
                voter: self.caller,
                choice,
                weight: resolved.effective_weight,
                timestamp: self.now,
                reason,
            },
        )?;
        if let Some(stored) = self.state.proposals.get_mut(&proposal_id) {
            super::super::tally::apply_weight_to_results(&mut stored.results, choice, resolved.effective_weight);
        }

        self.push(Value::Bool(true))?;
        self.push(Value::U64(resolved.token_cost))
    }

    fn op_treasury_transfer(&mut self) -> Result<(), GovernanceError> {
        let recipient = self.pop()?.as_address()?;
        let amount = self.pop()?.as_u64()?;
        let purpose = self.pop()?.as_str()?.to_string();
        let signatures_blob = self.pop()?.as_bytes()?.to_vec();
        let required_sigs = self.pop()?.as_u64()?;

        let mut seed = Vec::new();
        seed.extend_from_slice(&self.caller.0);
        seed.extend_from_slice(&recipient.0);
        seed.extend_from_slice(&amount.to_be_bytes());
        seed.extend_from_slice(purpose.as_bytes());
        seed.extend_from_slice(&self.now.to_be_bytes());
        let tx_id = Hash::of(&seed);

        DaoProcessor::treasury_create(
            self.state,
            self.config,
            self.events,
            tx_id,
            self.caller,
            recipient,
            amount,
            purpose.clone(),
            self.now,
        )?;

        let message = treasury_sign_message(&tx_id, &recipient, amount, &purpose);
        let mut verified = 0u64;
        for chunk in signatures_blob.chunks(SIG_ENTRY_LEN) {
            if chunk.len() != SIG_ENTRY_LEN {
                break;
            }
            let mut signer_bytes = [0u8; 32];
            signer_bytes.copy_from_slice(&chunk[..32]);
            let signer = Address(signer_bytes);
            let sig_bytes = &chunk[32..];
            if !self.signing.verify(&signer.0, &message, sig_bytes) {
                continue;
            }
            if DaoProcessor::treasury_sign(self.state, self.signing, self.events, tx_id, signer, sig_bytes, self.now).is_ok() {
                verified += 1;
            }
        }

        // Only attempt execution if the caller's asserted threshold was
        // actually met by verified signatures; executing unconditionally
        // regardless of signature count would defeat the multi-sig.
        if verified >= required_sigs {
            match DaoProcessor::treasury_execute(self.state, self.events, tx_id) {
                Ok(()) | Err(GovernanceError::Treasury(TreasuryError::InsufficientSignatures { .. })) => {}
                Err(other) => return Err(other),
            }
        }

        self.push(Value::Hash(tx_id))
    }

    fn op_mint_tokens(&mut self) -> Result<(), GovernanceError> {
        let recipient = self.pop()?.as_address()?;
        let amount = self.pop()?.as_u64()?;
        let _reason = self.pop()?; // audit-only, not persisted by the ledger itself
        DaoProcessor::mint(self.state, self.events, recipient, amount, self.now)?;
        self.push(Value::Bool(true))
    }

    fn op_burn_tokens(&mut self) -> Result<(), GovernanceError> {
        let amount = self.pop()?.as_u64()?;
        let _reason = self.pop()?;
        DaoProcessor::burn(self.state, self.config, self.events, self.caller, amount, self.now)?;
        self.push(Value::Bool(true))
    }

    fn push_serialized<T: Serialize>(&mut self, value: Option<&T>) -> Result<(), GovernanceError> {
        match value {
            Some(v) => {
                let bytes = serde_json::to_vec(v).map_err(|_| ValidationError::InvalidOperand)?;
                self.push(Value::Bytes(bytes))
            }
            None => self.push(Value::Nil),
        }
    }

    fn op_get_proposal(&mut self) -> Result<(), GovernanceError> {
        let id = self.pop()?.as_hash()?;
        let proposal = self.state.proposals.get(&id).cloned();
        self.push_serialized(proposal.as_ref())
    }

    fn op_get_vote(&mut self) -> Result<(), GovernanceError> {
        let proposal_id = self.pop()?.as_hash()?;
        let voter = self.pop()?.as_address()?;
        let vote = self
            .state
            .votes
            .get_votes(&proposal_id)
            .into_iter()
            .find(|v| v.voter == voter);
        self.push_serialized(vote.as_ref())
    }

    fn op_get_delegation(&mut self) -> Result<(), GovernanceError> {
        let delegator = self.pop()?.as_address()?;
        let delegation = self.state.delegation.get(&delegator).cloned();
        self.push_serialized(delegation.as_ref())
    }
}
