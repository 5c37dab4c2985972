//! Finite-horizon greedy lookahead.
//!
//! Every legal (cycle, chain) pairing is valued as its immediate score plus
//! `horizon` simulated rounds of future reward: the pairing is applied to a
//! cloned pool, and each simulated round greedily takes the best cycle and
//! best chain of the re-enumerated candidates, discounted by `discount`,
//! `discount` squared, and so on. The first pairing to reach the maximum
//! value wins. When one list is empty the search runs over the other alone.

use nephron_graph::{Chain, Cycle, ExchangeGraph};

use crate::candidates::{CandidateSet, CandidateSource};
use crate::config::PoolConfig;
use crate::policy::Action;
use crate::transition::{self, ArrivalQueue};

pub(crate) fn decide(
    config: &PoolConfig,
    g: &ExchangeGraph,
    queue: &ArrivalQueue,
    candidates: &CandidateSet,
    source: &dyn CandidateSource,
) -> Action {
    if candidates.is_empty() {
        return Action::default();
    }
    if candidates.chains.is_empty() {
        return best_over_cycles(config, g, queue, source, &candidates.cycles).1;
    }
    if candidates.cycles.is_empty() {
        return best_over_chains(config, g, queue, source, &candidates.chains).1;
    }

    let mut best: Option<(f64, Action)> = None;
    for cycle in &candidates.cycles {
        for chain in &candidates.chains {
            if overlaps(cycle, chain) {
                continue;
            }
            let action = Action {
                cycles: vec![cycle.clone()],
                chains: vec![chain.clone()],
            };
            let value = value_of(config, g, queue, source, &action);
            if best.as_ref().map_or(true, |(v, _)| value > *v) {
                best = Some((value, action));
            }
        }
    }
    match best {
        Some((_, action)) => action,
        // Every pairing shares a vertex; take the better lone axis, cycles
        // winning ties.
        None => {
            let (cycle_value, by_cycle) =
                best_over_cycles(config, g, queue, source, &candidates.cycles);
            let (chain_value, by_chain) =
                best_over_chains(config, g, queue, source, &candidates.chains);
            if chain_value > cycle_value {
                by_chain
            } else {
                by_cycle
            }
        }
    }
}

fn best_over_cycles(
    config: &PoolConfig,
    g: &ExchangeGraph,
    queue: &ArrivalQueue,
    source: &dyn CandidateSource,
    cycles: &[Cycle],
) -> (f64, Action) {
    let mut best = (f64::NEG_INFINITY, Action::default());
    for cycle in cycles {
        let action = Action {
            cycles: vec![cycle.clone()],
            chains: Vec::new(),
        };
        let value = value_of(config, g, queue, source, &action);
        if value > best.0 {
            best = (value, action);
        }
    }
    best
}

fn best_over_chains(
    config: &PoolConfig,
    g: &ExchangeGraph,
    queue: &ArrivalQueue,
    source: &dyn CandidateSource,
    chains: &[Chain],
) -> (f64, Action) {
    let mut best = (f64::NEG_INFINITY, Action::default());
    for chain in chains {
        let action = Action {
            cycles: Vec::new(),
            chains: vec![chain.clone()],
        };
        let value = value_of(config, g, queue, source, &action);
        if value > best.0 {
            best = (value, action);
        }
    }
    best
}

/// Immediate score plus discounted greedy reward over `horizon` simulated
/// rounds. Simulation runs on clones; the live pool is never touched.
fn value_of(
    config: &PoolConfig,
    g: &ExchangeGraph,
    queue: &ArrivalQueue,
    source: &dyn CandidateSource,
    action: &Action,
) -> f64 {
    let immediate = action.score();
    if config.horizon == 0 {
        return immediate;
    }

    let mut sim_g = g.clone();
    let mut sim_q = queue.clone();
    if transition::apply(&mut sim_g, action, &mut sim_q, config.attrition).is_err() {
        return immediate;
    }

    let mut value = immediate;
    for step in 1..=config.horizon {
        let set = source.candidates(&sim_g);
        let greedy = greedy_action(&set);
        value += config.discount.powi(step as i32) * greedy.score();
        if transition::apply(&mut sim_g, &greedy, &mut sim_q, config.attrition).is_err() {
            break;
        }
    }
    value
}

/// The best cycle and best chain taken together, unless they share a vertex,
/// in which case only the higher scorer (the cycle on ties) is kept.
fn greedy_action(set: &CandidateSet) -> Action {
    match (set.best_cycle(), set.best_chain()) {
        (Some(cycle), Some(chain)) if overlaps(cycle, chain) => {
            if chain.score > cycle.score {
                Action {
                    cycles: Vec::new(),
                    chains: vec![chain.clone()],
                }
            } else {
                Action {
                    cycles: vec![cycle.clone()],
                    chains: Vec::new(),
                }
            }
        }
        (cycle, chain) => Action {
            cycles: cycle.map(|c| vec![c.clone()]).unwrap_or_default(),
            chains: chain.map(|c| vec![c.clone()]).unwrap_or_default(),
        },
    }
}

fn overlaps(cycle: &Cycle, chain: &Chain) -> bool {
    chain.vertices.iter().any(|v| cycle.vertices.contains(v))
}
