use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{LayoutError, Result};
use crate::ir::{ClusterId, GroupedGraph};

/// Undirected weighted graph over clusters: the weight of a pair is the
/// (scaled) number of input edges running between their members.
#[derive(Debug, Clone, Default)]
pub struct ClusterGraph {
    clusters: BTreeSet<ClusterId>,
    weights: BTreeMap<(ClusterId, ClusterId), f64>,
}

impl ClusterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses `graph` onto its clusters. Edges inside one cluster are
    /// ignored; every inter-cluster edge adds `scale` to its pair.
    pub fn from_graph(graph: &GroupedGraph, scale: f64) -> Result<Self> {
        let mut out = Self::new();
        for spec in &graph.clusters {
            out.clusters.insert(spec.id);
        }
        let cluster_of: HashMap<&str, ClusterId> = graph
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.cluster))
            .collect();
        for edge in &graph.edges {
            let lookup = |id: &str| {
                cluster_of
                    .get(id)
                    .copied()
                    .ok_or_else(|| LayoutError::UnknownNode {
                        node: id.to_string(),
                    })
            };
            let from = lookup(&edge.from)?;
            let to = lookup(&edge.to)?;
            out.add_weight(from, to, scale);
        }
        Ok(out)
    }

    pub fn add_cluster(&mut self, cluster: ClusterId) {
        self.clusters.insert(cluster);
    }

    /// Adds `weight` between `a` and `b`. Self pairs are ignored.
    pub fn add_weight(&mut self, a: ClusterId, b: ClusterId, weight: f64) {
        self.clusters.insert(a);
        self.clusters.insert(b);
        if a == b {
            return;
        }
        *self.weights.entry(key(a, b)).or_insert(0.0) += weight;
    }

    pub fn weight(&self, a: ClusterId, b: ClusterId) -> f64 {
        if a == b {
            return 0.0;
        }
        self.weights.get(&key(a, b)).copied().unwrap_or(0.0)
    }

    pub fn clusters(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters.iter().copied()
    }

    /// Pairs with a non-zero weight, each reported once with `a < b`.
    pub fn weighted_pairs(&self) -> impl Iterator<Item = (ClusterId, ClusterId, f64)> + '_ {
        self.weights
            .iter()
            .filter(|(_, weight)| **weight != 0.0)
            .map(|(&(a, b), &weight)| (a, b, weight))
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }
}

fn key(a: ClusterId, b: ClusterId) -> (ClusterId, ClusterId) {
    if a <= b { (a, b) } else { (b, a) }
}
