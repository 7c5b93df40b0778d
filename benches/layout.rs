use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nested_treemap::layout::squarify::{normalize_sizes, squarify};
use nested_treemap::layout::{Bounds, compute_layout};
use nested_treemap::{GroupedGraph, IdentitySolver, LayoutConfig, MicrolpSolver};
use std::hint::black_box;
use std::time::Duration;

/// Root 0 with `groups` leaf clusters of uneven size, linked in a ring with
/// an extra chord every third cluster.
fn ring_of_clusters(groups: usize) -> GroupedGraph {
    let mut graph = GroupedGraph::new();
    graph.add_cluster(0, None);
    for g in 1..=groups {
        graph.add_cluster(g, Some(0));
        graph.add_members(g, &format!("g{g}_"), 2 + (g * 7) % 11);
    }
    for g in 1..=groups {
        let next = g % groups + 1;
        graph.add_edge(format!("g{g}_0"), format!("g{next}_1"));
        if g % 3 == 0 {
            let across = (g + groups / 2) % groups + 1;
            graph.add_edge(format!("g{g}_1"), format!("g{across}_0"));
        }
    }
    graph
}

fn bench_squarify(c: &mut Criterion) {
    let mut group = c.benchmark_group("squarify");
    for count in [16usize, 256, 4096] {
        let mut raw: Vec<f64> = (0..count).map(|i| 1.0 + ((i * 37) % 101) as f64).collect();
        raw.sort_by(|a, b| b.total_cmp(a));
        let sizes = normalize_sizes(&raw, 1200.0, 800.0);
        let bounds = Bounds::new(0.0, 0.0, 1200.0, 800.0);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sizes, |b, sizes| {
            b.iter(|| {
                let rects = squarify(black_box(sizes), bounds).unwrap_or_default();
                black_box(rects.len());
            });
        });
    }
    group.finish();
}

fn bench_identity_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_identity");
    let config = LayoutConfig::default();
    for groups in [4usize, 8, 16] {
        let graph = ring_of_clusters(groups);
        group.bench_with_input(BenchmarkId::from_parameter(groups), &graph, |b, graph| {
            b.iter(|| {
                let layout =
                    compute_layout(black_box(graph), &config, &IdentitySolver, Duration::ZERO);
                black_box(layout.map(|l| l.clusters.len()).unwrap_or(0));
            });
        });
    }
    group.finish();
}

fn bench_solved_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_microlp");
    group.sample_size(10);
    let config = LayoutConfig::default();
    for groups in [3usize, 4, 5] {
        let graph = ring_of_clusters(groups);
        group.bench_with_input(BenchmarkId::from_parameter(groups), &graph, |b, graph| {
            b.iter(|| {
                let limit = Duration::from_secs(60);
                let layout = compute_layout(black_box(graph), &config, &MicrolpSolver, limit);
                black_box(layout.map(|l| l.objective).unwrap_or(0.0));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_squarify, bench_identity_pipeline, bench_solved_pipeline);
criterion_main!(benches);
