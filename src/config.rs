//! Immutable governance configuration.
//!
//! Replaces global mutable configuration with an immutable struct passed
//! by reference; changes go through `apply_config_change`, which returns
//! a fresh struct rather than mutating in place. Shape and defaults
//! (serde-derived, `Default` impl) follow the prior runtime's
//! `blockchain::config::BlockchainConfig`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeSchedule {
    pub proposal: u64,
    pub vote: u64,
    pub delegation: u64,
    pub treasury_create: u64,
    pub token_op: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            proposal: 200,
            vote: 10,
            delegation: 10,
            treasury_create: 50,
            token_op: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GovernanceConfig {
    pub min_proposal_threshold: u64,
    pub voting_period_seconds: i64,
    pub quorum_threshold: u64,
    /// Basis points, e.g. 5100 == 51.00%.
    pub passing_threshold_bps: u32,
    pub treasury_threshold: u64,
    pub pending_tx_ttl_seconds: i64,
    pub fees: FeeSchedule,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            min_proposal_threshold: 1000,
            voting_period_seconds: 86_400,
            quorum_threshold: 2000,
            passing_threshold_bps: 5100,
            treasury_threshold: 5000,
            pending_tx_ttl_seconds: 86_400,
            fees: FeeSchedule::default(),
        }
    }
}

impl GovernanceConfig {
    /// Produces a new config with `f` applied to a mutable clone, so callers
    /// never mutate a shared, live `GovernanceConfig` in place.
    pub fn apply_config_change(&self, f: impl FnOnce(&mut GovernanceConfig)) -> GovernanceConfig {
        let mut next = self.clone();
        f(&mut next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values_are_the_documented_ones() {
        let cfg = GovernanceConfig::default();
        assert_eq!(cfg.min_proposal_threshold, 1000);
        assert_eq!(cfg.voting_period_seconds, 86_400);
        assert_eq!(cfg.quorum_threshold, 2000);
        assert_eq!(cfg.passing_threshold_bps, 5100);
        assert_eq!(cfg.treasury_threshold, 5000);
        assert_eq!(cfg.pending_tx_ttl_seconds, 86_400);
    }

    #[test]
    fn apply_config_change_does_not_mutate_original() {
        let cfg = GovernanceConfig::default();
        let changed = cfg.apply_config_change(|c| c.quorum_threshold = 5000);
        assert_eq!(cfg.quorum_threshold, 2000);
        assert_eq!(changed.quorum_threshold, 5000);
    }
}
