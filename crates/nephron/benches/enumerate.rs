use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nephron::graph::{ExchangeGraph, alg};
use std::hint::black_box;
use std::time::Duration;

#[derive(Debug, Clone)]
struct PoolSpec {
    edges: Vec<(String, String, f64)>,
    ndd_edges: Vec<(String, String, f64)>,
}

impl PoolSpec {
    fn build(&self) -> ExchangeGraph {
        let mut g = ExchangeGraph::new();
        g.add_edges(&self.edges).unwrap();
        g.add_ndd_edges(&self.ndd_edges).unwrap();
        g
    }
}

fn build_pool_spec(vertex_count: usize, fanout: usize) -> PoolSpec {
    let names: Vec<String> = (0..vertex_count).map(|i| i.to_string()).collect();
    let mut edges: Vec<(String, String, f64)> = Vec::new();

    // A ring spine so cycles of every admissible length exist.
    for i in 0..vertex_count {
        edges.push((names[i].clone(), names[(i + 1) % vertex_count].clone(), 1.0));
    }

    for i in 0..vertex_count {
        // Forward skips for density.
        for k in 2..=(fanout + 1) {
            let to = (i + k) % vertex_count;
            if to != i {
                edges.push((names[i].clone(), names[to].clone(), 0.5));
            }
        }
        // A backward edge closing short cycles.
        if i >= 3 {
            edges.push((names[i].clone(), names[i - 3].clone(), 0.25));
        }
    }

    let ndd_edges = (0..vertex_count / 10)
        .map(|i| (format!("n{i}"), names[(i * 7) % vertex_count].clone(), 0.75))
        .collect();

    PoolSpec { edges, ndd_edges }
}

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("pool_30_f2", 30usize, 2usize),
        ("pool_80_f3", 80, 3),
        ("pool_150_f3", 150, 3),
    ];

    for (name, vertices, fanout) in cases {
        let spec = build_pool_spec(vertices, fanout);
        let g = spec.build();

        group.bench_with_input(BenchmarkId::new("cycles_3", name), &g, |b, g| {
            b.iter(|| black_box(alg::enumerate_cycles(black_box(g), 3).len()))
        });
        group.bench_with_input(BenchmarkId::new("cycles_4", name), &g, |b, g| {
            b.iter(|| black_box(alg::enumerate_cycles(black_box(g), 4).len()))
        });
        group.bench_with_input(BenchmarkId::new("chains_3", name), &g, |b, g| {
            b.iter(|| black_box(alg::enumerate_chains(black_box(g), 3).len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enumerate);
criterion_main!(benches);
