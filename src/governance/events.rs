//! Typed governance events and the bounded, non-blocking channel that
//! carries them.
//!
//! Replaces the prior runtime's ad-hoc `interface{}`-map event data with
//! a closed enum; grounded on the
//! prior runtime's `ml::ml_monitoring::Alert`/`MonitoringRule` pattern of closed,
//! serde-derived event structs fed through a channel, applied here to one
//! closed `GovernanceEvent` enum instead of per-subsystem structs.

use crate::ids::{Address, Hash};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated { id: Hash, creator: Address },
    VoteCast { proposal_id: Hash, voter: Address, weight: u64 },
    ProposalFinalized { id: Hash, passed: bool },
    ProposalExecuted { id: Hash },
    DelegationChanged { delegator: Address, delegate: Option<Address> },
    TreasuryTxCreated { id: Hash, recipient: Address, amount: u64 },
    TreasuryTxSigned { id: Hash, signer: Address },
    TreasuryTxExecuted { id: Hash, recipient: Address, amount: u64 },
    TokenTransferred { from: Address, to: Address, amount: u64 },
}

/// Publishing side of the event channel. `emit` is best-effort: a full
/// channel drops the event and logs a warning rather than blocking the
/// block applier.
#[derive(Clone)]
pub struct EventSink {
    sender: Option<mpsc::Sender<GovernanceEvent>>,
}

impl EventSink {
    pub fn new(sender: mpsc::Sender<GovernanceEvent>) -> Self {
        Self { sender: Some(sender) }
    }

    /// A sink that discards every event, for callers (tests, the CLI demo)
    /// that have no subscriber.
    pub fn disconnected() -> Self {
        Self { sender: None }
    }

    pub fn emit(&self, event: GovernanceEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.try_send(event).is_err() {
            warn!("governance event channel full or closed, dropping event");
        }
    }
}

/// Convenience constructor for a bounded channel plus its `EventSink`,
/// mirroring the capacity the prior runtime picks for its monitoring channels.
pub fn channel(capacity: usize) -> (EventSink, mpsc::Receiver<GovernanceEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSink::new(tx), rx)
}
