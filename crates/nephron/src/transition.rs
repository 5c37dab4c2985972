//! Pool transition: admission, execution, attrition.
//!
//! One transition advances the pool a round. Admission moves the newest
//! connectable arrivals from the queue into the graph, execution removes
//! everything the chosen action matched, and attrition retires the
//! longest-waiting pairs. The order matters: an arrival admitted this round
//! can be matched no earlier than the next one.

use std::collections::BTreeSet;

use nephron_graph::ExchangeGraph;
use tracing::debug;

use crate::error::Result;
use crate::policy::Action;

/// Pending compatibility edges in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrivalQueue {
    pending: Vec<(String, String, f64)>,
}

impl ArrivalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: String, target: String, score: f64) {
        self.pending.push((source, target, score));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String, f64)> {
        self.pending.iter()
    }
}

impl FromIterator<(String, String, f64)> for ArrivalQueue {
    fn from_iter<I: IntoIterator<Item = (String, String, f64)>>(iter: I) -> Self {
        Self {
            pending: iter.into_iter().collect(),
        }
    }
}

/// What one transition did: the edges admitted from the queue, and every name
/// that left the pool (matched vertices, their chains' donors, attrition).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionOutcome {
    pub admitted: Vec<(String, String)>,
    pub removed: BTreeSet<String>,
}

/// Advances the pool one round: admission, then the action, then attrition of
/// the `attrition` longest-waiting vertices (skipped when no more than
/// `attrition` remain).
pub fn apply(
    g: &mut ExchangeGraph,
    action: &Action,
    queue: &mut ArrivalQueue,
    attrition: usize,
) -> Result<TransitionOutcome> {
    let admitted = admit(g, queue)?;
    let mut removed = execute(g, action);
    attrit(g, attrition, &mut removed);
    debug!(
        admitted = admitted.len(),
        removed = removed.len(),
        vertices = g.vertex_count(),
        queued = queue.len(),
        "transition applied"
    );
    Ok(TransitionOutcome { admitted, removed })
}

/// Admits pending edges whose endpoints are "new enough": one endpoint among
/// the two most recently seen names in the queue, the other already in the
/// graph. Admitted edges leave the queue; so do edges the graph already has
/// (without re-adding them). Unconnectable edges wait for a later round.
fn admit(g: &mut ExchangeGraph, queue: &mut ArrivalQueue) -> Result<Vec<(String, String)>> {
    let mut seen: Vec<&str> = Vec::new();
    for (source, target, _) in &queue.pending {
        for name in [source.as_str(), target.as_str()] {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    let frontier: Vec<String> = seen.iter().rev().take(2).map(|s| s.to_string()).collect();

    let mut batch: Vec<(String, String, f64)> = Vec::new();
    let mut waiting: Vec<(String, String, f64)> = Vec::new();
    for (source, target, score) in queue.pending.drain(..) {
        let connectable = (frontier.iter().any(|f| *f == source) && g.has_vertex(&target))
            || (frontier.iter().any(|f| *f == target) && g.has_vertex(&source));
        if !connectable {
            waiting.push((source, target, score));
            continue;
        }
        if g.has_edge(&source, &target)
            || batch.iter().any(|(s, t, _)| *s == source && *t == target)
        {
            // Already present; dequeue without re-adding.
            continue;
        }
        batch.push((source, target, score));
    }
    queue.pending = waiting;

    let admitted = batch.iter().map(|(s, t, _)| (s.clone(), t.clone())).collect();
    g.add_edges(&batch)?;
    Ok(admitted)
}

fn execute(g: &mut ExchangeGraph, action: &Action) -> BTreeSet<String> {
    let mut vertices: Vec<String> = Vec::new();
    let mut donors: Vec<String> = Vec::new();
    for cycle in &action.cycles {
        vertices.extend(cycle.vertices.iter().cloned());
    }
    for chain in &action.chains {
        donors.push(chain.ndd.clone());
        vertices.extend(chain.vertices.iter().cloned());
    }
    g.remove_vertices(&vertices);
    g.remove_ndds(&donors);
    vertices.into_iter().chain(donors).collect()
}

fn attrit(g: &mut ExchangeGraph, attrition: usize, removed: &mut BTreeSet<String>) {
    if attrition == 0 || g.vertex_count() <= attrition {
        return;
    }
    // Indices are assigned in arrival order and compaction preserves it, so
    // the lowest live indices are the longest-waiting vertices.
    let oldest: Vec<String> = (0..attrition)
        .filter_map(|v| g.vertex_name(v))
        .map(str::to_string)
        .collect();
    g.remove_vertices(&oldest);
    removed.extend(oldest);
}
