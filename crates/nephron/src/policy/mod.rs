//! Sequential matching policies.
//!
//! [`MatchingPolicy`] owns the decision configuration and dispatches each
//! round on its [`PolicyKind`]: finite-horizon greedy lookahead, or the
//! TD-learned linear value function. An empty candidate set is never an
//! error; the decision is simply an empty [`Action`].

mod lookahead;
mod td;

use std::collections::BTreeMap;

use nephron_graph::{Chain, Cycle, ExchangeGraph};

use crate::candidates::{CandidateSet, CandidateSource};
use crate::config::{PolicyKind, PoolConfig};
use crate::transition::ArrivalQueue;

/// The vertex-disjoint selection a policy commits to for one round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    pub cycles: Vec<Cycle>,
    pub chains: Vec<Chain>,
}

impl Action {
    pub fn len(&self) -> usize {
        self.cycles.len() + self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.chains.is_empty()
    }

    /// Sum of the selected candidates' scores.
    pub fn score(&self) -> f64 {
        let cycles: f64 = self.cycles.iter().map(|c| c.score).sum();
        let chains: f64 = self.chains.iter().map(|c| c.score).sum();
        cycles + chains
    }

    /// Every pair vertex the action matches, cycles first.
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.cycles
            .iter()
            .flat_map(|c| c.vertices.iter())
            .chain(self.chains.iter().flat_map(|c| c.vertices.iter()))
            .map(String::as_str)
    }

    /// The donors consumed by the action's chains.
    pub fn donors(&self) -> impl Iterator<Item = &str> {
        self.chains.iter().map(|c| c.ndd.as_str())
    }
}

/// Decision state for the round loop: the configured strategy plus the TD
/// weight vector, which persists across rounds (and, through the CLI's weight
/// files, across runs).
#[derive(Debug, Clone)]
pub struct MatchingPolicy {
    config: PoolConfig,
    weights: BTreeMap<String, f64>,
}

impl MatchingPolicy {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            weights: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        self.config.policy
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: BTreeMap<String, f64>) {
        self.weights = weights;
    }

    /// Chooses this round's action from `candidates`. The TD policy also
    /// nudges its weight vector once per evaluated vertex, which is why the
    /// receiver is mutable.
    pub fn decide(
        &mut self,
        g: &ExchangeGraph,
        queue: &ArrivalQueue,
        candidates: &CandidateSet,
        source: &dyn CandidateSource,
    ) -> Action {
        match self.config.policy {
            PolicyKind::Lookahead => lookahead::decide(&self.config, g, queue, candidates, source),
            PolicyKind::TdLearned => td::decide(
                &self.config,
                &mut self.weights,
                g,
                queue,
                candidates,
                source,
            ),
        }
    }
}
