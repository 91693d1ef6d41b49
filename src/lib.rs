//! DAO governance core — the typed transaction taxonomy, the governance
//! state machine (token ledger, delegation graph, proposals, voting
//! tally, multi-sig treasury), the stack-oriented governance VM, and the
//! per-block applier that dispatches transactions against it.

pub mod blockchain;
pub mod config;
pub mod delegation;
pub mod governance;
pub mod ids;
pub mod signing;
pub mod token;

pub use blockchain::{Block, Blockchain, Transaction};
pub use config::GovernanceConfig;
pub use governance::{Engine, GovernanceFacade};
pub use ids::{Address, Hash};
