//! Input validation. Everything here runs before any geometry or model work.

use std::collections::{BTreeMap, HashSet};

use crate::error::{LayoutError, Result};
use crate::ir::{ClusterId, GroupedGraph};

/// The cluster hierarchy with clusters renumbered densely (in ascending id
/// order).
#[derive(Debug, Clone)]
pub struct ClusterForest {
    pub ids: Vec<ClusterId>,
    pub parents: Vec<Option<usize>>,
    pub root: usize,
    index: BTreeMap<ClusterId, usize>,
}

impl ClusterForest {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, cluster: ClusterId) -> Option<usize> {
        self.index.get(&cluster).copied()
    }
}

pub fn validate_canvas(width: f64, height: f64) -> Result<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(LayoutError::InvalidCanvas { width, height });
    }
    Ok(())
}

pub fn validate_weight_scale(scale: f64) -> Result<()> {
    if !(scale.is_finite() && scale >= 0.0) {
        return Err(LayoutError::InvalidWeightScale { scale });
    }
    Ok(())
}

/// Checks that the parent pointers form a single tree and returns it.
pub fn build_forest(graph: &GroupedGraph) -> Result<ClusterForest> {
    let mut index = BTreeMap::new();
    for spec in &graph.clusters {
        if index.insert(spec.id, 0).is_some() {
            return Err(LayoutError::DuplicateCluster { cluster: spec.id });
        }
    }
    for (dense, slot) in index.values_mut().enumerate() {
        *slot = dense;
    }
    let ids: Vec<ClusterId> = index.keys().copied().collect();

    let mut parents = vec![None; ids.len()];
    let mut root: Option<ClusterId> = None;
    for spec in &graph.clusters {
        let me = index[&spec.id];
        match spec.parent {
            Some(parent) => {
                let Some(&dense) = index.get(&parent) else {
                    return Err(LayoutError::UnknownCluster {
                        cluster: parent,
                        referenced_by: format!("parent of cluster {}", spec.id),
                    });
                };
                parents[me] = Some(dense);
            }
            None => {
                if let Some(first) = root {
                    return Err(LayoutError::MultipleRoots {
                        first,
                        second: spec.id,
                    });
                }
                root = Some(spec.id);
            }
        }
    }
    let Some(root) = root else {
        return Err(LayoutError::NoRoot);
    };
    let root = index[&root];

    for start in 0..ids.len() {
        let mut seen = HashSet::new();
        let mut current = start;
        while let Some(parent) = parents[current] {
            if !seen.insert(current) {
                return Err(if on_cycle(&parents, start) {
                    LayoutError::Cycle {
                        cluster: ids[start],
                    }
                } else {
                    LayoutError::Orphan {
                        cluster: ids[start],
                    }
                });
            }
            current = parent;
        }
        if current != root {
            return Err(LayoutError::Orphan {
                cluster: ids[start],
            });
        }
    }

    Ok(ClusterForest {
        ids,
        parents,
        root,
        index,
    })
}

fn on_cycle(parents: &[Option<usize>], start: usize) -> bool {
    let mut current = parents[start];
    for _ in 0..parents.len() {
        match current {
            Some(node) if node == start => return true,
            Some(node) => current = parents[node],
            None => return false,
        }
    }
    false
}

/// Member count per cluster (dense order). Every leaf cluster must have at
/// least one member.
pub fn cluster_sizes(
    graph: &GroupedGraph,
    forest: &ClusterForest,
    children: &[Vec<usize>],
) -> Result<Vec<f64>> {
    let mut sizes = vec![0.0; forest.len()];
    for node in &graph.nodes {
        let Some(dense) = forest.index_of(node.cluster) else {
            return Err(LayoutError::UnknownCluster {
                cluster: node.cluster,
                referenced_by: format!("node {}", node.id),
            });
        };
        sizes[dense] += 1.0;
    }
    for (dense, size) in sizes.iter().enumerate() {
        if children[dense].is_empty() && *size <= 0.0 {
            return Err(LayoutError::NonPositiveSize {
                cluster: forest.ids[dense],
                size: *size,
            });
        }
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::nested::nest;

    fn hierarchy(entries: &[(ClusterId, Option<ClusterId>)]) -> GroupedGraph {
        let mut graph = GroupedGraph::new();
        for &(id, parent) in entries {
            graph.add_cluster(id, parent);
        }
        graph
    }

    #[test]
    fn accepts_a_tree_with_sparse_ids() {
        let graph = hierarchy(&[(40, None), (7, Some(40)), (9, Some(40)), (3, Some(7))]);
        let forest = build_forest(&graph).unwrap();
        assert_eq!(forest.ids, vec![3, 7, 9, 40]);
        assert_eq!(forest.root, 3);
        assert_eq!(forest.parents[0], Some(1));
        assert_eq!(forest.index_of(9), Some(2));
    }

    #[test]
    fn rejects_missing_and_extra_roots() {
        let cyclic = hierarchy(&[(0, Some(1)), (1, Some(0))]);
        assert_eq!(build_forest(&cyclic).unwrap_err(), LayoutError::NoRoot);
        let two = hierarchy(&[(0, None), (1, None)]);
        assert_eq!(
            build_forest(&two).unwrap_err(),
            LayoutError::MultipleRoots { first: 0, second: 1 }
        );
    }

    #[test]
    fn reports_cycles_and_orphans() {
        let graph = hierarchy(&[(0, None), (1, Some(2)), (2, Some(1))]);
        assert_eq!(
            build_forest(&graph).unwrap_err(),
            LayoutError::Cycle { cluster: 1 }
        );
        let graph = hierarchy(&[(0, None), (1, Some(2)), (2, Some(3)), (3, Some(2))]);
        assert_eq!(
            build_forest(&graph).unwrap_err(),
            LayoutError::Orphan { cluster: 1 }
        );
        let graph = hierarchy(&[(0, None), (1, Some(1))]);
        assert_eq!(
            build_forest(&graph).unwrap_err(),
            LayoutError::Cycle { cluster: 1 }
        );
    }

    #[test]
    fn rejects_unknown_and_duplicate_clusters() {
        let graph = hierarchy(&[(0, None), (1, Some(5))]);
        assert!(matches!(
            build_forest(&graph).unwrap_err(),
            LayoutError::UnknownCluster { cluster: 5, .. }
        ));
        let graph = hierarchy(&[(0, None), (0, None)]);
        assert_eq!(
            build_forest(&graph).unwrap_err(),
            LayoutError::DuplicateCluster { cluster: 0 }
        );
    }

    #[test]
    fn empty_leaf_cluster_is_rejected() {
        let mut graph = hierarchy(&[(0, None), (1, Some(0)), (2, Some(0))]);
        graph.add_members(1, "a", 3);
        let forest = build_forest(&graph).unwrap();
        let children = nest(&forest.parents);
        assert_eq!(
            cluster_sizes(&graph, &forest, &children).unwrap_err(),
            LayoutError::NonPositiveSize { cluster: 2, size: 0.0 }
        );
        graph.add_node("b0", 2);
        let sizes = cluster_sizes(&graph, &forest, &children).unwrap();
        assert_eq!(sizes, vec![0.0, 3.0, 1.0]);
    }

    #[test]
    fn rejects_bad_canvas_and_weight_scale() {
        assert!(validate_canvas(10.0, 5.0).is_ok());
        assert!(validate_canvas(0.0, 5.0).is_err());
        assert!(validate_canvas(f64::NAN, 5.0).is_err());
        assert!(validate_weight_scale(0.0).is_ok());
        assert_eq!(
            validate_weight_scale(-1.0),
            Err(LayoutError::InvalidWeightScale { scale: -1.0 })
        );
        assert!(validate_weight_scale(f64::NAN).is_err());
    }
}
