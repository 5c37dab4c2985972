//! Cycle and chain enumeration over the exchange digraph.
//!
//! Cycles are discovered by a bounded depth-first search that only starts from
//! the cycle's minimum internal index and never descends to a lower index, so
//! every directed cycle is reported exactly once without a dedup set. Reported
//! vertex sequences keep edge order but are rotated so the lexicographically
//! smallest name leads, which is the canonical presentation form.
//!
//! A chain is any non-empty path out of a non-directed donor; every prefix of
//! a longer path is reported as its own chain.

use crate::graph::ExchangeGraph;

/// A simultaneous exchange cycle of pair vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Vertex names in edge order, rotated so the smallest name leads.
    pub vertices: Vec<String>,
    /// Sum of edge scores around the cycle, including the closing edge.
    pub score: f64,
}

/// A donation chain started by a non-directed donor.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// The donor that triggers the chain.
    pub ndd: String,
    /// Pair vertices in transplant order. The donor itself is not listed.
    pub vertices: Vec<String>,
    /// Sum of edge scores along the chain, starting with the donor's edge.
    pub score: f64,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Rotates the vertex sequence so the lexicographically smallest name
    /// leads. Edge order is preserved.
    pub fn canonicalize(&mut self) {
        let lead = self
            .vertices
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.vertices.rotate_left(lead);
    }
}

impl Chain {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Enumerates every directed cycle of `2..=max_cycle` vertices.
pub fn enumerate_cycles(g: &ExchangeGraph, max_cycle: usize) -> Vec<Cycle> {
    enumerate_cycles_with_prob(g, max_cycle, 1.0)
}

/// Like [`enumerate_cycles`], but discounts each cycle's score by
/// `edge_success_prob` raised to the cycle length. With a probability of `1.0`
/// the scores are the plain edge sums.
pub fn enumerate_cycles_with_prob(
    g: &ExchangeGraph,
    max_cycle: usize,
    edge_success_prob: f64,
) -> Vec<Cycle> {
    fn dfs(
        g: &ExchangeGraph,
        start: usize,
        v: usize,
        sum: f64,
        max_cycle: usize,
        edge_success_prob: f64,
        path: &mut Vec<usize>,
        on_path: &mut Vec<bool>,
        out: &mut Vec<Cycle>,
    ) {
        for e in g.out_edges(v) {
            if e.target == start {
                if path.len() >= 2 {
                    let score = (sum + e.score) * edge_success_prob.powi(path.len() as i32);
                    let mut cycle = Cycle {
                        vertices: names(g, path),
                        score,
                    };
                    cycle.canonicalize();
                    out.push(cycle);
                }
            } else if e.target > start && !on_path[e.target] && path.len() < max_cycle {
                path.push(e.target);
                on_path[e.target] = true;
                dfs(
                    g,
                    start,
                    e.target,
                    sum + e.score,
                    max_cycle,
                    edge_success_prob,
                    path,
                    on_path,
                    out,
                );
                on_path[e.target] = false;
                path.pop();
            }
        }
    }

    let mut out: Vec<Cycle> = Vec::new();
    let mut on_path = vec![false; g.vertex_count()];
    for start in 0..g.vertex_count() {
        let mut path = vec![start];
        on_path[start] = true;
        dfs(
            g,
            start,
            start,
            0.0,
            max_cycle,
            edge_success_prob,
            &mut path,
            &mut on_path,
            &mut out,
        );
        on_path[start] = false;
    }
    out
}

/// Enumerates every chain of `1..=max_chain` pair vertices, donor by donor in
/// registry order.
pub fn enumerate_chains(g: &ExchangeGraph, max_chain: usize) -> Vec<Chain> {
    fn dfs(
        g: &ExchangeGraph,
        ndd: &str,
        v: usize,
        sum: f64,
        max_chain: usize,
        path: &mut Vec<usize>,
        on_path: &mut Vec<bool>,
        out: &mut Vec<Chain>,
    ) {
        out.push(Chain {
            ndd: ndd.to_string(),
            vertices: names(g, path),
            score: sum,
        });
        if path.len() >= max_chain {
            return;
        }
        for e in g.out_edges(v) {
            if on_path[e.target] {
                continue;
            }
            path.push(e.target);
            on_path[e.target] = true;
            dfs(g, ndd, e.target, sum + e.score, max_chain, path, on_path, out);
            on_path[e.target] = false;
            path.pop();
        }
    }

    let mut out: Vec<Chain> = Vec::new();
    if max_chain == 0 {
        return out;
    }
    let mut on_path = vec![false; g.vertex_count()];
    for n in 0..g.ndd_count() {
        let Some(ndd) = g.ndd_name(n) else {
            continue;
        };
        for e in g.ndd_out_edges(n) {
            let mut path = vec![e.target];
            on_path[e.target] = true;
            dfs(
                g,
                ndd,
                e.target,
                e.score,
                max_chain,
                &mut path,
                &mut on_path,
                &mut out,
            );
            on_path[e.target] = false;
        }
    }
    out
}

fn names(g: &ExchangeGraph, path: &[usize]) -> Vec<String> {
    path.iter()
        .filter_map(|&v| g.vertex_name(v))
        .map(str::to_string)
        .collect()
}
