//! TD-learned linear value policy.
//!
//! Q(v) is the dot product of the learned weight vector with the vertex's
//! standardized feature vector. A cycle is accepted when every member's
//! myopic share of its score (score over cycle length) is at least that
//! member's Q value; chains are judged the same way with the donor counted as
//! an extra slot. Each evaluated vertex also drives one temporal-difference
//! step: the target is the discounted best share the vertex could still earn
//! next round if nothing were matched now, zero once it is gone.

use std::collections::BTreeMap;

use nephron_graph::ExchangeGraph;
use rustc_hash::FxHashSet;

use crate::candidates::{CandidateSet, CandidateSource};
use crate::config::PoolConfig;
use crate::features;
use crate::policy::Action;
use crate::transition::{self, ArrivalQueue};

pub(crate) fn decide(
    config: &PoolConfig,
    weights: &mut BTreeMap<String, f64>,
    g: &ExchangeGraph,
    queue: &ArrivalQueue,
    candidates: &CandidateSet,
    source: &dyn CandidateSource,
) -> Action {
    if candidates.is_empty() {
        return Action::default();
    }

    // The TD target looks one empty-action round ahead. The simulation does
    // not depend on which vertex is being evaluated, so it runs once.
    let next = next_round(config, g, queue, source);

    let mut action = Action::default();
    let mut taken: FxHashSet<&str> = FxHashSet::default();
    let mut taken_donors: FxHashSet<&str> = FxHashSet::default();

    for cycle in &candidates.cycles {
        let share = cycle.score / cycle.len() as f64;
        let mut accept = true;
        for vertex in &cycle.vertices {
            let q = evaluate(config, weights, g, &next, vertex);
            if share < q {
                accept = false;
            }
        }
        if accept && cycle.vertices.iter().all(|v| !taken.contains(v.as_str())) {
            for vertex in &cycle.vertices {
                taken.insert(vertex.as_str());
            }
            action.cycles.push(cycle.clone());
        }
    }

    for chain in &candidates.chains {
        let share = chain.score / (1 + chain.len()) as f64;
        let mut accept = true;
        for vertex in &chain.vertices {
            let q = evaluate(config, weights, g, &next, vertex);
            if share < q {
                accept = false;
            }
        }
        if accept
            && !taken_donors.contains(chain.ndd.as_str())
            && chain.vertices.iter().all(|v| !taken.contains(v.as_str()))
        {
            taken_donors.insert(chain.ndd.as_str());
            for vertex in &chain.vertices {
                taken.insert(vertex.as_str());
            }
            action.chains.push(chain.clone());
        }
    }

    action
}

/// Scores one vertex against the current weights, then applies its TD update.
/// Returns the pre-update Q value, which is what the acceptance test uses.
fn evaluate(
    config: &PoolConfig,
    weights: &mut BTreeMap<String, f64>,
    g: &ExchangeGraph,
    next: &CandidateSet,
    vertex: &str,
) -> f64 {
    let features = features::vertex_feature_vector(g, vertex, config.feature_cycle_bound);
    let q = q_value(weights, &features);
    let correction = config.discount * next_share(next, vertex) - q;
    for (name, value) in &features {
        *weights.entry(name.clone()).or_insert(0.0) += config.alpha * correction * value;
    }
    q
}

fn q_value(weights: &BTreeMap<String, f64>, features: &BTreeMap<String, f64>) -> f64 {
    features
        .iter()
        .map(|(name, value)| weights.get(name).copied().unwrap_or(0.0) * value)
        .sum()
}

/// The best myopic share `vertex` reaches among next-round candidates, zero
/// when no candidate still contains it.
fn next_share(next: &CandidateSet, vertex: &str) -> f64 {
    let mut best = 0.0_f64;
    for cycle in &next.cycles {
        if cycle.vertices.iter().any(|v| v == vertex) {
            best = best.max(cycle.score / cycle.len() as f64);
        }
    }
    for chain in &next.chains {
        if chain.vertices.iter().any(|v| v == vertex) {
            best = best.max(chain.score / (1 + chain.len()) as f64);
        }
    }
    best
}

fn next_round(
    config: &PoolConfig,
    g: &ExchangeGraph,
    queue: &ArrivalQueue,
    source: &dyn CandidateSource,
) -> CandidateSet {
    let mut sim_g = g.clone();
    let mut sim_q = queue.clone();
    match transition::apply(&mut sim_g, &Action::default(), &mut sim_q, config.attrition) {
        Ok(_) => source.candidates(&sim_g),
        Err(_) => CandidateSet::default(),
    }
}
