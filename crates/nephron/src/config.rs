//! Round configuration shared by the enumerator, the policies, and the
//! transition.

use serde::{Deserialize, Serialize};

/// Which decision strategy drives each round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Finite-horizon greedy lookahead over simulated future rounds.
    #[default]
    Lookahead,
    /// Linear value function over standardized features, trained by
    /// temporal-difference updates while it decides.
    TdLearned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Largest number of pairs in an exchange cycle.
    pub max_cycle: usize,
    /// Largest number of pairs in a donation chain.
    pub max_chain: usize,
    /// Per-edge success probability for failure-aware cycle scores.
    pub edge_success_prob: f64,
    /// Reward discount per simulated future round.
    pub discount: f64,
    /// Simulated rounds evaluated after the immediate action.
    pub horizon: usize,
    /// Pairs leaving the pool each round, oldest first.
    pub attrition: usize,
    /// Step size of the temporal-difference weight update.
    pub alpha: f64,
    /// Cycle length bound used when counting cycles as a graph feature.
    pub feature_cycle_bound: usize,
    pub policy: PolicyKind,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_cycle: 3,
            max_chain: 3,
            edge_success_prob: 1.0,
            discount: 0.9,
            horizon: 2,
            attrition: 2,
            alpha: 0.2,
            feature_cycle_bound: 3,
            policy: PolicyKind::Lookahead,
        }
    }
}
