//! Graph- and vertex-level statistics feeding the learned policy.
//!
//! A vertex's feature vector merges pool-wide statistics with its own degrees
//! and is then standardized across the vector's values (zero mean, unit
//! variance) so weight magnitudes stay comparable. With fewer than two values
//! or zero variance the vector degrades to all zeros instead of dividing by
//! zero.

use nephron_graph::{ExchangeGraph, alg};
use std::collections::BTreeMap;

/// Pool-wide statistics: degree summary, vertex count, and the number of
/// cycles no longer than `cycle_bound`.
pub fn graph_features(g: &ExchangeGraph, cycle_bound: usize) -> BTreeMap<String, f64> {
    let n = g.vertex_count();
    let mut mean_in = 0.0;
    let mut mean_out = 0.0;
    let mut max_in = 0usize;
    let mut max_out = 0usize;
    for v in 0..n {
        let din = g.in_degree(v);
        let dout = g.out_degree(v);
        mean_in += din as f64;
        mean_out += dout as f64;
        max_in = max_in.max(din);
        max_out = max_out.max(dout);
    }
    if n > 0 {
        mean_in /= n as f64;
        mean_out /= n as f64;
    }

    let mut features = BTreeMap::new();
    features.insert("mean_in_degree".to_string(), mean_in);
    features.insert("max_in_degree".to_string(), max_in as f64);
    features.insert("mean_out_degree".to_string(), mean_out);
    features.insert("max_out_degree".to_string(), max_out as f64);
    features.insert("vertex_count".to_string(), n as f64);
    features.insert(
        "cycle_count".to_string(),
        alg::enumerate_cycles(g, cycle_bound).len() as f64,
    );
    features
}

/// A single vertex's degrees. Unknown names read as zero on both.
pub fn vertex_features(g: &ExchangeGraph, vertex: &str) -> BTreeMap<String, f64> {
    let (din, dout) = match g.vertex_index(vertex) {
        Some(v) => (g.in_degree(v) as f64, g.out_degree(v) as f64),
        None => (0.0, 0.0),
    };
    let mut features = BTreeMap::new();
    features.insert("in_degree".to_string(), din);
    features.insert("out_degree".to_string(), dout);
    features
}

/// The merged graph+vertex feature vector, standardized in place. A vertex
/// no longer in the pool gets the all-zero vector.
pub fn vertex_feature_vector(
    g: &ExchangeGraph,
    vertex: &str,
    cycle_bound: usize,
) -> BTreeMap<String, f64> {
    let mut features = graph_features(g, cycle_bound);
    features.append(&mut vertex_features(g, vertex));
    if g.has_vertex(vertex) {
        standardize(&mut features);
    } else {
        for value in features.values_mut() {
            *value = 0.0;
        }
    }
    features
}

/// Z-scores the map's values against each other, using the sample standard
/// deviation. Degrades to all zeros rather than dividing by zero.
pub fn standardize(features: &mut BTreeMap<String, f64>) {
    let n = features.len();
    if n < 2 {
        for value in features.values_mut() {
            *value = 0.0;
        }
        return;
    }
    let mean = features.values().sum::<f64>() / n as f64;
    let var = features.values().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        for value in features.values_mut() {
            *value = 0.0;
        }
        return;
    }
    for value in features.values_mut() {
        *value = (*value - mean) / std;
    }
}
