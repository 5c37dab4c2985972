//! The round loop: enumerate, decide, transition.

use std::collections::{BTreeMap, BTreeSet};

use nephron_graph::{Chain, Cycle, ExchangeGraph};
use serde_json::json;
use tracing::debug;

use crate::candidates::{CandidateSet, CandidateSource, Enumerated};
use crate::config::PoolConfig;
use crate::error::Result;
use crate::policy::{Action, MatchingPolicy};
use crate::transition::{self, ArrivalQueue};

/// A dynamic exchange pool: the live graph, the arrival queue, and the
/// decision policy, advanced one round at a time.
pub struct Pool {
    graph: ExchangeGraph,
    queue: ArrivalQueue,
    config: PoolConfig,
    policy: MatchingPolicy,
    source: Box<dyn CandidateSource>,
    rounds: usize,
}

/// Everything one round produced, for display or JSON output.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: usize,
    pub action: Action,
    pub admitted: Vec<(String, String)>,
    pub removed: BTreeSet<String>,
    /// The round's candidates minus everything the transition removed.
    pub remaining: CandidateSet,
}

impl Pool {
    /// A pool backed by the built-in enumerating candidate source.
    pub fn new(graph: ExchangeGraph, queue: ArrivalQueue, config: PoolConfig) -> Self {
        let source = Box::new(Enumerated::from_config(&config));
        Self::with_source(graph, queue, config, source)
    }

    /// A pool drawing candidates from an external source, such as an
    /// optimizer sitting behind [`CandidateSource`].
    pub fn with_source(
        graph: ExchangeGraph,
        queue: ArrivalQueue,
        config: PoolConfig,
        source: Box<dyn CandidateSource>,
    ) -> Self {
        let policy = MatchingPolicy::new(config.clone());
        Self {
            graph,
            queue,
            config,
            policy,
            source,
            rounds: 0,
        }
    }

    pub fn graph(&self) -> &ExchangeGraph {
        &self.graph
    }

    pub fn queue(&self) -> &ArrivalQueue {
        &self.queue
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Completed rounds so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The TD policy's learned weight vector. Empty until the policy runs
    /// (or the weights are seeded).
    pub fn weights(&self) -> &BTreeMap<String, f64> {
        self.policy.weights()
    }

    pub fn set_weights(&mut self, weights: BTreeMap<String, f64>) {
        self.policy.set_weights(weights);
    }

    /// Runs one enumerate-decide-transition round.
    pub fn round(&mut self) -> Result<RoundReport> {
        self.rounds += 1;
        let candidates = self.source.candidates(&self.graph);
        debug!(
            round = self.rounds,
            cycles = candidates.cycles.len(),
            chains = candidates.chains.len(),
            "candidates ready"
        );

        let action = self
            .policy
            .decide(&self.graph, &self.queue, &candidates, self.source.as_ref());
        debug!(
            round = self.rounds,
            cycles = action.cycles.len(),
            chains = action.chains.len(),
            score = action.score(),
            "action chosen"
        );

        let outcome = transition::apply(
            &mut self.graph,
            &action,
            &mut self.queue,
            self.config.attrition,
        )?;
        let mut remaining = candidates;
        remaining.prune(&outcome.removed);

        Ok(RoundReport {
            round: self.rounds,
            action,
            admitted: outcome.admitted,
            removed: outcome.removed,
            remaining,
        })
    }
}

impl RoundReport {
    /// The report as one JSON value, in the shape the CLI's `--json` prints.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "round": self.round,
            "action": {
                "cycles": self.action.cycles.iter().map(cycle_json).collect::<Vec<_>>(),
                "chains": self.action.chains.iter().map(chain_json).collect::<Vec<_>>(),
                "score": self.action.score(),
            },
            "admitted": self.admitted,
            "removed": self.removed,
            "remaining": {
                "cycles": self.remaining.cycles.iter().map(cycle_json).collect::<Vec<_>>(),
                "chains": self.remaining.chains.iter().map(chain_json).collect::<Vec<_>>(),
            },
        })
    }
}

fn cycle_json(cycle: &Cycle) -> serde_json::Value {
    json!({ "vertices": cycle.vertices, "score": cycle.score })
}

fn chain_json(chain: &Chain) -> serde_json::Value {
    json!({ "ndd": chain.ndd, "vertices": chain.vertices, "score": chain.score })
}
