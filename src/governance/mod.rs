//! The DAO governance engine: proposals, voting, delegation, the token
//! ledger, the multi-sig treasury, and the stack-oriented governance VM
//! that exposes the same operations as opcodes to contract bytecode.

pub mod error;
pub mod events;
pub mod facade;
pub mod processor;
pub mod proposal;
pub mod state;
pub mod tally;
pub mod treasury;
pub mod validator;
pub mod vm;
pub mod vote;

pub use error::GovernanceError;
pub use events::{EventSink, GovernanceEvent};
pub use facade::{GovernanceFacade, GovernanceStats};
pub use processor::DaoProcessor;
pub use proposal::{
    NewProposal, Proposal, ProposalRegistry, ProposalStatus, ProposalType, TreasuryPayout, VotingType,
};
pub use state::GovernanceState;
pub use treasury::{PendingTx, TreasuryState};
pub use validator::DaoValidator;
pub use vote::{Vote, VoteChoice, VoteStore};

use std::sync::Arc;

use crate::config::GovernanceConfig;
use crate::signing::SigningBackend;

/// Bundles the pieces a block applier (or the VM) needs to drive the
/// engine: the shared state, the immutable config, a signing backend for
/// treasury signature verification, and an event sink. Cloning an
/// `Engine` is cheap — every field is `Arc`-backed or `Clone`-cheap.
#[derive(Clone)]
pub struct Engine {
    pub state: GovernanceState,
    pub config: Arc<GovernanceConfig>,
    pub signing: Arc<dyn SigningBackend>,
    pub events: EventSink,
}

impl Engine {
    pub fn new(config: GovernanceConfig, signing: Arc<dyn SigningBackend>, events: EventSink) -> Self {
        Self {
            state: GovernanceState::new(),
            config: Arc::new(config),
            signing,
            events,
        }
    }

    pub fn facade(&self) -> GovernanceFacade {
        GovernanceFacade::new(self.state.clone())
    }
}
