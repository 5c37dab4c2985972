use std::collections::BTreeMap;

use nephron::graph::{Cycle, ExchangeGraph};
use nephron::{
    ArrivalQueue, CandidateSet, CandidateSource, PolicyKind, Pool, PoolConfig,
};

fn e(from: &str, to: &str, score: f64) -> (String, String, f64) {
    (from.to_string(), to.to_string(), score)
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn triangle() -> ExchangeGraph {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("0", "1", 0.5), e("1", "2", 0.3), e("2", "0", 0.7)])
        .unwrap();
    g
}

#[test]
fn a_round_matches_the_triangle_and_reports_it() {
    let config = PoolConfig {
        horizon: 0,
        attrition: 0,
        ..PoolConfig::default()
    };
    let mut pool = Pool::new(triangle(), ArrivalQueue::new(), config);

    let report = pool.round().unwrap();

    assert_eq!(report.round, 1);
    assert_eq!(report.action.cycles.len(), 1);
    assert_eq!(report.action.cycles[0].vertices, names(&["0", "1", "2"]));
    assert_eq!(report.action.cycles[0].score, 1.5);
    assert!(report.admitted.is_empty());
    assert_eq!(report.removed.len(), 3);
    assert!(report.remaining.is_empty());

    assert_eq!(pool.graph().vertex_count(), 0);
    assert_eq!(pool.rounds(), 1);
}

#[test]
fn admitted_arrivals_become_matchable_in_a_later_round() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("x", "y", 1.0)]).unwrap();
    let queue: ArrivalQueue = [("y".to_string(), "x".to_string(), 2.0)]
        .into_iter()
        .collect();

    let config = PoolConfig {
        horizon: 0,
        attrition: 0,
        ..PoolConfig::default()
    };
    let mut pool = Pool::new(g, queue, config);

    let first = pool.round().unwrap();
    assert!(first.action.is_empty());
    assert_eq!(first.admitted, vec![("y".to_string(), "x".to_string())]);
    assert!(pool.queue().is_empty());

    let second = pool.round().unwrap();
    assert_eq!(second.action.cycles.len(), 1);
    assert_eq!(second.action.cycles[0].score, 3.0);
    assert_eq!(pool.graph().vertex_count(), 0);
}

#[test]
fn remaining_keeps_candidates_the_transition_did_not_touch() {
    // Two disjoint 2-cycles plus attrition disabled: the policy takes one
    // pair per round, so the other cycle stays in `remaining`.
    let mut g = ExchangeGraph::new();
    g.add_edges(&[
        e("a", "b", 5.0),
        e("b", "a", 5.0),
        e("c", "d", 1.0),
        e("d", "c", 1.0),
    ])
    .unwrap();

    let config = PoolConfig {
        horizon: 0,
        attrition: 0,
        ..PoolConfig::default()
    };
    let mut pool = Pool::new(g, ArrivalQueue::new(), config);

    let report = pool.round().unwrap();
    assert_eq!(report.action.cycles[0].vertices, names(&["a", "b"]));
    assert_eq!(report.remaining.cycles.len(), 1);
    assert_eq!(report.remaining.cycles[0].vertices, names(&["c", "d"]));
}

#[test]
fn seeded_weights_survive_rounds_without_candidates() {
    let config = PoolConfig {
        policy: PolicyKind::TdLearned,
        ..PoolConfig::default()
    };
    let mut pool = Pool::new(ExchangeGraph::new(), ArrivalQueue::new(), config);

    let mut weights = BTreeMap::new();
    weights.insert("vertex_count".to_string(), 1.25);
    pool.set_weights(weights);

    pool.round().unwrap();
    assert_eq!(pool.weights()["vertex_count"], 1.25);
}

#[test]
fn an_external_candidate_source_drives_the_round() {
    struct Fixed(CandidateSet);

    impl CandidateSource for Fixed {
        fn candidates(&self, _g: &ExchangeGraph) -> CandidateSet {
            self.0.clone()
        }
    }

    let fixed = Fixed(CandidateSet {
        cycles: vec![Cycle {
            vertices: names(&["0", "1"]),
            score: 9.0,
        }],
        chains: Vec::new(),
    });

    let config = PoolConfig {
        horizon: 0,
        attrition: 0,
        ..PoolConfig::default()
    };
    let mut pool = Pool::with_source(triangle(), ArrivalQueue::new(), config, Box::new(fixed));

    let report = pool.round().unwrap();
    assert_eq!(report.action.cycles[0].score, 9.0);
    let survivors: Vec<&str> = pool.graph().vertex_names().collect();
    assert_eq!(survivors, vec!["2"]);
}

#[test]
fn round_reports_serialize_to_the_cli_json_shape() {
    let config = PoolConfig {
        horizon: 0,
        attrition: 0,
        ..PoolConfig::default()
    };
    let mut pool = Pool::new(triangle(), ArrivalQueue::new(), config);

    let v = pool.round().unwrap().to_json();
    assert_eq!(v["round"], 1);
    assert_eq!(v["action"]["cycles"][0]["vertices"][0], "0");
    assert_eq!(v["action"]["cycles"][0]["score"], 1.5);
    assert_eq!(v["action"]["chains"], serde_json::json!([]));
    assert_eq!(v["removed"][0], "0");
}