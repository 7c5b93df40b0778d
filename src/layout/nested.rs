//! Squarified partitioning over an explicit cluster forest.

use super::hierarchy::{Fold, build_fold};
use super::squarify::{normalize_sizes, squarify};
use super::types::{Axis, Bounds, NestedTree, NodeId, Orientation, Rect, TreeNode};
use crate::error::Result;
use crate::ir::ClusterId;

/// Rectangle assigned to one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterBox {
    pub bounds: Bounds,
    pub orientation: Orientation,
    pub pass: usize,
    pub depth: usize,
}

impl ClusterBox {
    fn rect(&self) -> Rect {
        Rect {
            x: self.bounds.x,
            y: self.bounds.y,
            width: self.bounds.width,
            height: self.bounds.height,
            orientation: self.orientation,
            pass: self.pass,
        }
    }
}

/// Children lists from parent pointers, in index order.
pub fn nest(parents: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); parents.len()];
    for (node, parent) in parents.iter().enumerate() {
        if let Some(parent) = parent {
            children[*parent].push(node);
        }
    }
    children
}

/// Size of every cluster: its own size for leaves, the sum over its
/// descendant leaves otherwise. Post-order, each cluster computed once.
pub fn aggregate_sizes(sizes: &[f64], children: &[Vec<usize>]) -> Vec<f64> {
    let mut memo: Vec<Option<f64>> = vec![None; sizes.len()];
    for start in 0..sizes.len() {
        if memo[start].is_some() {
            continue;
        }
        let mut stack = vec![(start, false)];
        while let Some((node, expanded)) = stack.pop() {
            if memo[node].is_some() {
                continue;
            }
            if children[node].is_empty() {
                memo[node] = Some(sizes[node]);
            } else if expanded {
                let total = children[node]
                    .iter()
                    .map(|child| memo[*child].unwrap_or(0.0))
                    .sum();
                memo[node] = Some(total);
            } else {
                stack.push((node, true));
                for &child in &children[node] {
                    if memo[child].is_none() {
                        stack.push((child, false));
                    }
                }
            }
        }
    }
    memo.into_iter().map(|size| size.unwrap_or(0.0)).collect()
}

/// Sorts every children list by size, largest first. Ties keep index order.
pub fn sort_children(children: &mut [Vec<usize>], sizes: &[f64]) {
    for list in children.iter_mut() {
        list.sort_by(|a, b| sizes[*b].total_cmp(&sizes[*a]).then(a.cmp(b)));
    }
}

/// Assigns a rectangle to every cluster reachable from `root`, recursing
/// depth-first. Children lists must be sorted by size, largest first.
pub fn nested_squarify(
    sizes: &[f64],
    children: &[Vec<usize>],
    root: usize,
    bounds: Bounds,
) -> Result<Vec<ClusterBox>> {
    let mut boxes = vec![
        ClusterBox {
            bounds: Bounds::new(bounds.x, bounds.y, 0.0, 0.0),
            orientation: Orientation::Row,
            pass: 0,
            depth: 0,
        };
        sizes.len()
    ];
    boxes[root] = ClusterBox {
        bounds,
        orientation: Orientation::for_bounds(bounds.width, bounds.height),
        pass: 0,
        depth: 0,
    };

    let mut stack = vec![root];
    while let Some(parent) = stack.pop() {
        if children[parent].is_empty() {
            continue;
        }
        let area = boxes[parent].bounds;
        let child_sizes: Vec<f64> = children[parent].iter().map(|c| sizes[*c]).collect();
        let normalized = normalize_sizes(&child_sizes, area.width, area.height);
        let tiles = squarify(&normalized, area)?;
        let depth = boxes[parent].depth + 1;
        for (&child, tile) in children[parent].iter().zip(&tiles) {
            boxes[child] = ClusterBox {
                bounds: tile.bounds(),
                orientation: tile.orientation,
                pass: tile.pass,
                depth,
            };
        }
        stack.extend(children[parent].iter().rev().copied());
    }
    Ok(boxes)
}

/// Builds the nested tree: every internal cluster's node becomes the root of
/// the fold over its children's rectangles, and the fold's leaves are the
/// child clusters' nodes.
pub fn build_nested_tree(
    boxes: &[ClusterBox],
    children: &[Vec<usize>],
    root: usize,
    ids: &[ClusterId],
) -> NestedTree {
    let root_box = boxes[root];
    let mut nodes = vec![cluster_node(
        0,
        None,
        root_box.orientation.chain_axis(),
        0,
        &root_box,
        ids[root],
    )];

    let mut stack = vec![(root, 0)];
    while let Some((cluster, node)) = stack.pop() {
        if children[cluster].is_empty() {
            continue;
        }
        let rects: Vec<Rect> = children[cluster].iter().map(|c| boxes[*c].rect()).collect();
        let Some(fold) = build_fold(&rects) else {
            continue;
        };
        let fold_root = fold.node(fold.root());
        if fold_root.is_leaf() {
            let child = children[cluster][0];
            let id = nodes.len();
            let split = nodes[node].split.flip();
            nodes.push(cluster_node(id, Some(node), split, 0, &boxes[child], ids[child]));
            nodes[node].children.push(id);
            stack.push((child, id));
            continue;
        }
        nodes[node].split = fold_root.split;
        let depth = nodes[node].depth;
        let mut splice = Splice {
            fold: &fold,
            boxes,
            members: &children[cluster],
            ids,
            depth,
            nodes: &mut nodes,
            pending: Vec::new(),
        };
        for &fold_child in &fold_root.children {
            splice.attach(fold_child, node);
        }
        let pending = splice.pending;
        stack.extend(pending.into_iter().rev());
    }

    NestedTree::from_nodes(nodes, 0)
}

struct Splice<'a> {
    fold: &'a Fold,
    boxes: &'a [ClusterBox],
    members: &'a [usize],
    ids: &'a [ClusterId],
    depth: usize,
    nodes: &'a mut Vec<TreeNode>,
    pending: Vec<(usize, NodeId)>,
}

impl Splice<'_> {
    fn attach(&mut self, fold_id: usize, parent: NodeId) {
        let fold = self.fold;
        let fold_node = fold.node(fold_id);
        let id = self.nodes.len();
        let sibling_index = self.nodes[parent].children.len();
        let node = match fold_node.rect {
            Some(member) => {
                let cluster = self.members[member];
                self.pending.push((cluster, id));
                cluster_node(
                    id,
                    Some(parent),
                    fold_node.split,
                    sibling_index,
                    &self.boxes[cluster],
                    self.ids[cluster],
                )
            }
            None => TreeNode {
                id,
                parent: Some(parent),
                split: fold_node.split,
                width: fold_node.bounds.width,
                height: fold_node.bounds.height,
                sibling_index,
                children: Vec::new(),
                cluster: None,
                depth: self.depth,
                x: fold_node.bounds.x,
                y: fold_node.bounds.y,
            },
        };
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        for &child in &fold_node.children {
            self.attach(child, id);
        }
    }
}

fn cluster_node(
    id: NodeId,
    parent: Option<NodeId>,
    split: Axis,
    sibling_index: usize,
    cluster_box: &ClusterBox,
    cluster: ClusterId,
) -> TreeNode {
    TreeNode {
        id,
        parent,
        split,
        width: cluster_box.bounds.width,
        height: cluster_box.bounds.height,
        sibling_index,
        children: Vec::new(),
        cluster: Some(cluster),
        depth: cluster_box.depth,
        x: cluster_box.bounds.x,
        y: cluster_box.bounds.y,
    }
}
