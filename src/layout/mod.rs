pub mod cluster_graph;
pub mod hierarchy;
pub mod nested;
pub mod squarify;
pub mod types;
pub mod validate;

pub use cluster_graph::ClusterGraph;
pub use types::*;

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{Config, LayoutConfig};
use crate::error::Result;
use crate::ir::GroupedGraph;
use crate::order::{OrderModel, SolveStatus, Solver, resolve};
use nested::{aggregate_sizes, build_nested_tree, nest, nested_squarify, sort_children};
use validate::{build_forest, cluster_sizes, validate_canvas, validate_weight_scale};

/// Lays out every cluster of `graph` on the configured canvas and reorders
/// siblings with `solver` so that strongly connected leaf clusters end up
/// close to each other.
pub fn compute_layout(
    graph: &GroupedGraph,
    config: &LayoutConfig,
    solver: &dyn Solver,
    time_limit: Duration,
) -> Result<Layout> {
    validate_canvas(config.width, config.height)?;
    validate_weight_scale(config.weight_scale)?;
    let forest = build_forest(graph)?;
    let mut children = nest(&forest.parents);
    let sizes = cluster_sizes(graph, &forest, &children)?;
    let weights = ClusterGraph::from_graph(graph, config.weight_scale)?;
    debug!(
        clusters = forest.len(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        total_weight = weights.total_weight(),
        "validated input"
    );

    let totals = aggregate_sizes(&sizes, &children);
    sort_children(&mut children, &totals);
    let canvas = Bounds::new(0.0, 0.0, config.width, config.height);
    let boxes = nested_squarify(&totals, &children, forest.root, canvas)?;
    let tree = build_nested_tree(&boxes, &children, forest.root, &forest.ids);
    debug!(nodes = tree.len(), leaves = tree.leaves().len(), "built nested tree");

    let model = OrderModel::build(&tree, &weights);
    let outcome = solver.submit(model.problem(), time_limit)?;
    if outcome.status == SolveStatus::Timeout {
        warn!(
            solver = solver.name(),
            limit_secs = time_limit.as_secs_f64(),
            "solver hit the time limit, using its best assignment"
        );
    }
    let resolved = resolve(&tree, &model, &outcome)?;

    let mut clusters: Vec<ClusterLayout> = resolved
        .tree
        .nodes()
        .iter()
        .filter_map(|node| {
            let cluster = node.cluster?;
            let bounds = node.bounds().inset(config.margin * node.depth as f64);
            Some(ClusterLayout {
                cluster,
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
                depth: node.depth,
            })
        })
        .collect();
    clusters.sort_by_key(|entry| entry.cluster);

    info!(
        clusters = clusters.len(),
        status = %resolved.status,
        objective = resolved.objective,
        "layout complete"
    );
    Ok(Layout {
        width: config.width,
        height: config.height,
        clusters,
        status: resolved.status,
        objective: resolved.objective,
    })
}

/// [`compute_layout`] with the solver and time limit taken from `config`.
pub fn solve_layout(graph: &GroupedGraph, config: &Config) -> Result<Layout> {
    let solver = config.solver.build_solver();
    compute_layout(graph, &config.layout, solver.as_ref(), config.solver.time_limit())
}
