use serde::Serialize;

use crate::ir::ClusterId;
use crate::order::SolveStatus;

/// Index into a [`NestedTree`] arena.
pub type NodeId = usize;

/// How a squarify strip was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    /// Strip against the left edge of a box at least as wide as it is tall;
    /// its rectangles are stacked top to bottom and the leftover is to the right.
    Row,
    /// Strip against the top edge of a box taller than it is wide; its
    /// rectangles run left to right and the leftover is below.
    Column,
}

impl Orientation {
    pub fn for_bounds(width: f64, height: f64) -> Self {
        if width >= height {
            Orientation::Row
        } else {
            Orientation::Column
        }
    }

    /// Axis along which consecutive strips of this orientation advance.
    pub fn chain_axis(self) -> Axis {
        match self {
            Orientation::Row => Axis::Horizontal,
            Orientation::Column => Axis::Vertical,
        }
    }
}

/// Axis along which a tree node lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn flip(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Longer side over shorter side; infinite for a degenerate rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return f64::INFINITY;
        }
        (self.width / self.height).max(self.height / self.width)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn union(self, other: Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Shrinks by `margin` on each side. A dimension no larger than
    /// `2 * margin` is left as it is.
    pub fn inset(self, margin: f64) -> Self {
        let mut out = self;
        if margin <= 0.0 {
            return out;
        }
        if out.width > 2.0 * margin {
            out.x += margin;
            out.width -= 2.0 * margin;
        }
        if out.height > 2.0 * margin {
            out.y += margin;
            out.height -= 2.0 * margin;
        }
        out
    }
}

/// One rectangle produced by the squarified partitioner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    /// Index of the squarify pass (strip) that produced this rectangle.
    pub pass: usize,
}

impl Rect {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Longer side over shorter side; infinite for a degenerate rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        self.bounds().aspect_ratio()
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Axis along which this node's children are laid out.
    pub split: Axis,
    pub width: f64,
    pub height: f64,
    /// Position among the parent's children; rewritten once an order is solved.
    pub sibling_index: usize,
    /// Children in the order the partitioner produced them. Never reordered.
    pub children: Vec<NodeId>,
    /// Set on nodes that stand for an input cluster; `None` on the grouping
    /// nodes introduced by folding strips.
    pub cluster: Option<ClusterId>,
    /// Nesting depth of the cluster this node belongs to.
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// One summand of the coordinate fold: `extent` counts towards `target`'s
/// offset along `axis` when `sibling` precedes `target` under `parent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldingTerm {
    pub axis: Axis,
    pub parent: NodeId,
    pub sibling: NodeId,
    pub target: NodeId,
    pub extent: f64,
}

/// Arena-backed nested tree. Topology is fixed once built; only sibling
/// indices and coordinates change afterwards.
#[derive(Debug, Clone)]
pub struct NestedTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl NestedTree {
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|node| node.id)
            .collect()
    }

    /// Nodes with at least two children, i.e. those with ordering freedom.
    pub fn branching_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.children.len() >= 2)
            .map(|node| node.id)
            .collect()
    }

    pub fn cluster_node(&self, cluster: ClusterId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.cluster == Some(cluster))
            .map(|node| node.id)
    }

    /// `id` followed by its ancestors, stopping before the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            out.push(current);
            current = parent;
        }
        out
    }

    pub fn ordered_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = self.nodes[id].children.clone();
        children.sort_by_key(|child| self.nodes[*child].sibling_index);
        children
    }

    /// Every term of the coordinate fold for `id`: for each ancestor `g`
    /// (including `id`, excluding the root) and each sibling `s` of `g`, the
    /// extent of `s` along the parent's split axis.
    pub fn folding_terms(&self, id: NodeId) -> Vec<FoldingTerm> {
        let mut terms = Vec::new();
        for target in self.ancestors(id) {
            let Some(parent) = self.nodes[target].parent else {
                continue;
            };
            let axis = self.nodes[parent].split;
            for &sibling in &self.nodes[parent].children {
                if sibling == target {
                    continue;
                }
                terms.push(FoldingTerm {
                    axis,
                    parent,
                    sibling,
                    target,
                    extent: self.nodes[sibling].extent(axis),
                });
            }
        }
        terms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterLayout {
    pub cluster: ClusterId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: usize,
}

impl ClusterLayout {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// Final layout: one rectangle per cluster, ordered by cluster id.
#[derive(Debug, Clone)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub clusters: Vec<ClusterLayout>,
    pub status: SolveStatus,
    pub objective: f64,
}

impl Layout {
    pub fn cluster(&self, cluster: ClusterId) -> Option<&ClusterLayout> {
        self.clusters.iter().find(|entry| entry.cluster == cluster)
    }
}
