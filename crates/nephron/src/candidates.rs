//! Candidate sets and the optimizer seam.
//!
//! A [`CandidateSet`] holds everything a policy may select from in one round.
//! Sets come either from the built-in [`Enumerated`] source or from an
//! external optimizer through [`CandidateSet::from_parallel`], the wire
//! contract of name sequences with parallel score lists.

use std::collections::BTreeSet;

use nephron_graph::{Chain, Cycle, ExchangeGraph, alg};

use crate::config::PoolConfig;
use crate::error::{Error, Result};

/// The cycles and chains available to a policy for one pool snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub cycles: Vec<Cycle>,
    pub chains: Vec<Chain>,
}

impl CandidateSet {
    /// Builds a set from an optimizer's parallel lists. Each cycle entry is a
    /// vertex sequence in edge order; each chain entry lists the donor first
    /// and then its pair vertices. Cycles are canonicalized on entry so
    /// external sets compare equal to enumerated ones.
    ///
    /// Entries that cannot describe an exchange are rejected: a cycle needs
    /// at least two distinct vertices, a chain a donor followed by at least
    /// one distinct pair vertex.
    pub fn from_parallel(
        cycles: Vec<Vec<String>>,
        cycle_scores: Vec<f64>,
        chains: Vec<Vec<String>>,
        chain_scores: Vec<f64>,
    ) -> Result<Self> {
        if cycles.len() != cycle_scores.len() {
            return Err(Error::MismatchedScores {
                kind: "cycle",
                items: cycles.len(),
                scores: cycle_scores.len(),
            });
        }
        if chains.len() != chain_scores.len() {
            return Err(Error::MismatchedScores {
                kind: "chain",
                items: chains.len(),
                scores: chain_scores.len(),
            });
        }
        fn repeats(names: &[String]) -> bool {
            names.iter().enumerate().any(|(i, n)| names[..i].contains(n))
        }
        for (index, cycle) in cycles.iter().enumerate() {
            if cycle.len() < 2 || repeats(cycle) {
                return Err(Error::MalformedCycle { index });
            }
        }
        for (index, chain) in chains.iter().enumerate() {
            if chain.len() < 2 || repeats(&chain[1..]) {
                return Err(Error::MalformedChain { index });
            }
        }

        let cycles = cycles
            .into_iter()
            .zip(cycle_scores)
            .map(|(vertices, score)| {
                let mut cycle = Cycle { vertices, score };
                cycle.canonicalize();
                cycle
            })
            .collect();
        let mut split = Vec::with_capacity(chains.len());
        for (mut names, score) in chains.into_iter().zip(chain_scores) {
            let vertices = names.split_off(1);
            // Validated non-empty above.
            if let Some(ndd) = names.pop() {
                split.push(Chain {
                    ndd,
                    vertices,
                    score,
                });
            }
        }
        Ok(Self {
            cycles,
            chains: split,
        })
    }

    pub fn len(&self) -> usize {
        self.cycles.len() + self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.chains.is_empty()
    }

    /// The highest-scoring cycle; the first one encountered wins ties.
    pub fn best_cycle(&self) -> Option<&Cycle> {
        let mut best: Option<&Cycle> = None;
        for cycle in &self.cycles {
            if best.map_or(true, |b| cycle.score > b.score) {
                best = Some(cycle);
            }
        }
        best
    }

    /// The highest-scoring chain; the first one encountered wins ties.
    pub fn best_chain(&self) -> Option<&Chain> {
        let mut best: Option<&Chain> = None;
        for chain in &self.chains {
            if best.map_or(true, |b| chain.score > b.score) {
                best = Some(chain);
            }
        }
        best
    }

    /// Drops every candidate touching a removed name. Chains check their
    /// donor as well as their pair vertices.
    pub fn prune(&mut self, removed: &BTreeSet<String>) {
        self.cycles
            .retain(|c| !c.vertices.iter().any(|v| removed.contains(v)));
        self.chains.retain(|c| {
            !removed.contains(&c.ndd) && !c.vertices.iter().any(|v| removed.contains(v))
        });
    }
}

/// Where candidates come from each round. The built-in implementation
/// enumerates the graph; an external optimizer slots in behind the same
/// trait.
pub trait CandidateSource {
    fn candidates(&self, g: &ExchangeGraph) -> CandidateSet;
}

/// Bounded enumeration over the live graph, the default source.
#[derive(Debug, Clone, Copy)]
pub struct Enumerated {
    pub max_cycle: usize,
    pub max_chain: usize,
    pub edge_success_prob: f64,
}

impl Enumerated {
    pub fn from_config(config: &PoolConfig) -> Self {
        Self {
            max_cycle: config.max_cycle,
            max_chain: config.max_chain,
            edge_success_prob: config.edge_success_prob,
        }
    }
}

impl CandidateSource for Enumerated {
    fn candidates(&self, g: &ExchangeGraph) -> CandidateSet {
        CandidateSet {
            cycles: alg::enumerate_cycles_with_prob(g, self.max_cycle, self.edge_success_prob),
            chains: alg::enumerate_chains(g, self.max_chain),
        }
    }
}
