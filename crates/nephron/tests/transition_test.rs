use nephron::graph::{Chain, Cycle, ExchangeGraph};
use nephron::transition::{self, ArrivalQueue};
use nephron::Action;

fn e(from: &str, to: &str, score: f64) -> (String, String, f64) {
    (from.to_string(), to.to_string(), score)
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn queue_of(edges: &[(&str, &str, f64)]) -> ArrivalQueue {
    edges
        .iter()
        .map(|(f, t, s)| (f.to_string(), t.to_string(), *s))
        .collect()
}

#[test]
fn admission_connects_the_two_newest_names_to_the_graph() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0)]).unwrap();

    // First-appearance order across the queue is c, d, a, e, b, so the
    // admission frontier is {e, b}.
    let mut queue = queue_of(&[
        ("c", "d", 1.0),
        ("d", "a", 1.0),
        ("e", "b", 1.0),
        ("b", "e", 1.0),
    ]);

    let outcome = transition::apply(&mut g, &Action::default(), &mut queue, 0).unwrap();

    assert_eq!(
        outcome.admitted,
        vec![
            ("e".to_string(), "b".to_string()),
            ("b".to_string(), "e".to_string()),
        ]
    );
    assert!(g.has_edge("e", "b"));
    assert!(g.has_edge("b", "e"));
    assert_eq!(g.vertex_count(), 3);

    // The unconnectable arrivals keep waiting instead of being dropped.
    assert_eq!(queue.len(), 2);
    let waiting: Vec<&(String, String, f64)> = queue.iter().collect();
    assert_eq!(waiting[0].0, "c");
    assert_eq!(waiting[1].0, "d");
}

#[test]
fn admission_dequeues_edges_the_graph_already_has_without_readding() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0)]).unwrap();

    let mut queue = queue_of(&[("a", "b", 9.0)]);
    let outcome = transition::apply(&mut g, &Action::default(), &mut queue, 0).unwrap();

    assert!(outcome.admitted.is_empty());
    assert!(queue.is_empty());
    assert_eq!(g.edge_score("a", "b"), Some(1.0));
}

#[test]
fn admission_collapses_duplicates_within_one_batch() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0)]).unwrap();

    let mut queue = queue_of(&[("x", "a", 1.0), ("x", "a", 2.0)]);
    let outcome = transition::apply(&mut g, &Action::default(), &mut queue, 0).unwrap();

    assert_eq!(outcome.admitted.len(), 1);
    assert!(queue.is_empty());
    assert_eq!(g.edge_score("x", "a"), Some(1.0));
}

#[test]
fn execution_removes_matched_vertices_and_chain_donors() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0), e("b", "a", 1.0), e("c", "a", 1.0)])
        .unwrap();
    g.add_ndd_edges(&[e("n0", "c", 0.5)]).unwrap();

    let action = Action {
        cycles: vec![Cycle {
            vertices: names(&["a", "b"]),
            score: 2.0,
        }],
        chains: vec![Chain {
            ndd: "n0".to_string(),
            vertices: names(&["c"]),
            score: 0.5,
        }],
    };

    let mut queue = ArrivalQueue::new();
    let outcome = transition::apply(&mut g, &action, &mut queue, 0).unwrap();

    assert_eq!(g.vertex_count(), 0);
    assert_eq!(g.ndd_count(), 0);
    let removed: Vec<&str> = outcome.removed.iter().map(String::as_str).collect();
    assert_eq!(removed, vec!["a", "b", "c", "n0"]);
}

#[test]
fn attrition_retires_the_longest_waiting_vertices() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0), e("b", "c", 1.0), e("c", "d", 1.0)])
        .unwrap();

    let mut queue = ArrivalQueue::new();
    let outcome = transition::apply(&mut g, &Action::default(), &mut queue, 2).unwrap();

    let removed: Vec<&str> = outcome.removed.iter().map(String::as_str).collect();
    assert_eq!(removed, vec!["a", "b"]);
    let survivors: Vec<&str> = g.vertex_names().collect();
    assert_eq!(survivors, vec!["c", "d"]);
    assert!(g.has_edge("c", "d"));
}

#[test]
fn attrition_skips_a_pool_no_larger_than_its_count() {
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0)]).unwrap();

    let mut queue = ArrivalQueue::new();
    let outcome = transition::apply(&mut g, &Action::default(), &mut queue, 2).unwrap();

    assert!(outcome.removed.is_empty());
    assert_eq!(g.vertex_count(), 2);
}

#[test]
fn attrition_is_fifo_across_execution_rebuilds() {
    // Arrival order a, b, c, d, e. The action takes a and b, so the oldest
    // survivors c and d attrite, leaving only e.
    let mut g = ExchangeGraph::new();
    g.add_edges(&[
        e("a", "b", 1.0),
        e("b", "a", 1.0),
        e("c", "d", 1.0),
        e("d", "e", 1.0),
    ])
    .unwrap();

    let action = Action {
        cycles: vec![Cycle {
            vertices: names(&["a", "b"]),
            score: 2.0,
        }],
        chains: Vec::new(),
    };

    let mut queue = ArrivalQueue::new();
    let outcome = transition::apply(&mut g, &action, &mut queue, 2).unwrap();

    let survivors: Vec<&str> = g.vertex_names().collect();
    assert_eq!(survivors, vec!["e"]);
    assert!(outcome.removed.contains("c"));
    assert!(outcome.removed.contains("d"));
}

#[test]
fn admission_happens_before_attrition_counts_the_pool() {
    // With only one vertex pair in the graph the pool would be too small to
    // attrite, but the admitted arrival pushes it over the count.
    let mut g = ExchangeGraph::new();
    g.add_edges(&[e("a", "b", 1.0)]).unwrap();

    let mut queue = queue_of(&[("c", "a", 1.0)]);
    let outcome = transition::apply(&mut g, &Action::default(), &mut queue, 2).unwrap();

    assert_eq!(outcome.admitted.len(), 1);
    assert_eq!(g.vertex_count(), 1);
    let survivors: Vec<&str> = g.vertex_names().collect();
    assert_eq!(survivors, vec!["c"]);
}
