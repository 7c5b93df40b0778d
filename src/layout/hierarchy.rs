//! Folds the flat strip sequence produced by [`squarify`](super::squarify)
//! into a nested tree whose levels alternate between horizontal and vertical
//! splits.
//!
//! A strip of `Row` orientation sits against the left edge of its box, so
//! consecutive row strips advance along x and together form a horizontal
//! chain. Inside a strip the rectangles are stacked across the chain axis.
//! When the orientation changes, the remainder becomes a nested chain along
//! the other axis. Single-child groups collapse into their child, and a group
//! that ends up with the same axis as its parent is spliced into it, so every
//! internal node splits along the negation of its parent's axis.

use super::types::{Axis, Bounds, Orientation, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct FoldNode {
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Index of the input rectangle this leaf stands for.
    pub rect: Option<usize>,
    pub split: Axis,
    pub bounds: Bounds,
    pub depth: usize,
    pub sibling_index: usize,
}

impl FoldNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Nested tree over one sibling group's rectangles. Node 0 is the root and
/// nodes are numbered in depth-first pre-order.
#[derive(Debug, Clone)]
pub struct Fold {
    nodes: Vec<FoldNode>,
}

impl Fold {
    pub fn root(&self) -> usize {
        0
    }

    pub fn nodes(&self) -> &[FoldNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> &FoldNode {
        &self.nodes[id]
    }
}

#[derive(Debug)]
enum Shape {
    Leaf(usize),
    Group { axis: Axis, items: Vec<Shape> },
}

struct Strip {
    orientation: Orientation,
    members: Vec<usize>,
}

/// Builds the fold for `rects`. Returns `None` for an empty input.
pub fn build_fold(rects: &[Rect]) -> Option<Fold> {
    let strips = group_strips(rects);
    if strips.is_empty() {
        return None;
    }
    let shape = chain(&strips);
    let mut nodes = Vec::new();
    materialize(shape, None, 0, 0, rects, &mut nodes);
    Some(Fold { nodes })
}

fn group_strips(rects: &[Rect]) -> Vec<Strip> {
    let mut strips: Vec<Strip> = Vec::new();
    let mut current_pass = None;
    for (index, rect) in rects.iter().enumerate() {
        if current_pass == Some(rect.pass)
            && let Some(strip) = strips.last_mut()
        {
            strip.members.push(index);
            continue;
        }
        current_pass = Some(rect.pass);
        strips.push(Strip {
            orientation: rect.orientation,
            members: vec![index],
        });
    }
    strips
}

fn chain(strips: &[Strip]) -> Shape {
    let head = strips[0].orientation;
    let axis = head.chain_axis();
    let mut items = Vec::new();
    let mut next = 0;
    while next < strips.len() && strips[next].orientation == head {
        push_item(&mut items, axis, strip_shape(&strips[next]));
        next += 1;
    }
    if next < strips.len() {
        push_item(&mut items, axis, chain(&strips[next..]));
    }
    if items.len() == 1
        && let Some(only) = items.pop()
    {
        return only;
    }
    Shape::Group { axis, items }
}

fn strip_shape(strip: &Strip) -> Shape {
    if let [only] = strip.members.as_slice() {
        return Shape::Leaf(*only);
    }
    Shape::Group {
        axis: strip.orientation.chain_axis().flip(),
        items: strip.members.iter().map(|&m| Shape::Leaf(m)).collect(),
    }
}

fn push_item(items: &mut Vec<Shape>, axis: Axis, item: Shape) {
    match item {
        Shape::Group {
            axis: inner,
            items: nested,
        } if inner == axis => items.extend(nested),
        other => items.push(other),
    }
}

fn materialize(
    shape: Shape,
    parent: Option<(usize, Axis)>,
    depth: usize,
    sibling_index: usize,
    rects: &[Rect],
    nodes: &mut Vec<FoldNode>,
) -> usize {
    let id = nodes.len();
    match shape {
        Shape::Leaf(index) => {
            let rect = &rects[index];
            let split = match parent {
                Some((_, axis)) => axis.flip(),
                None => rect.orientation.chain_axis(),
            };
            nodes.push(FoldNode {
                parent: parent.map(|(p, _)| p),
                children: Vec::new(),
                rect: Some(index),
                split,
                bounds: rect.bounds(),
                depth,
                sibling_index,
            });
        }
        Shape::Group { axis, items } => {
            nodes.push(FoldNode {
                parent: parent.map(|(p, _)| p),
                children: Vec::new(),
                rect: None,
                split: axis,
                bounds: Bounds::new(0.0, 0.0, 0.0, 0.0),
                depth,
                sibling_index,
            });
            let mut children = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                children.push(materialize(
                    item,
                    Some((id, axis)),
                    depth + 1,
                    index,
                    rects,
                    nodes,
                ));
            }
            let bounds = children
                .iter()
                .map(|child| nodes[*child].bounds)
                .reduce(Bounds::union);
            if let Some(bounds) = bounds {
                nodes[id].bounds = bounds;
            }
            nodes[id].children = children;
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::squarify::{normalize_sizes, squarify};

    const EPS: f64 = 1e-9;

    fn rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        orientation: Orientation,
        pass: usize,
    ) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
            orientation,
            pass,
        }
    }

    fn assert_well_formed(fold: &Fold) {
        for node in fold.nodes() {
            if let Some(parent) = node.parent {
                let parent = fold.node(parent);
                if !node.is_leaf() {
                    assert_ne!(node.split, parent.split);
                }
                assert_eq!(node.depth, parent.depth + 1);
            }
            if node.is_leaf() {
                continue;
            }
            let (along, across) = match node.split {
                Axis::Horizontal => (node.bounds.width, node.bounds.height),
                Axis::Vertical => (node.bounds.height, node.bounds.width),
            };
            let mut sum = 0.0;
            for (index, child) in node.children.iter().enumerate() {
                let child = fold.node(*child);
                assert_eq!(child.sibling_index, index);
                let (child_along, child_across) = match node.split {
                    Axis::Horizontal => (child.bounds.width, child.bounds.height),
                    Axis::Vertical => (child.bounds.height, child.bounds.width),
                };
                assert!((child_across - across).abs() < 1e-6);
                sum += child_along;
            }
            assert!((sum - along).abs() < 1e-6);
        }
    }

    #[test]
    fn folds_four_clusters_into_alternating_chain() {
        let rects = squarify(&[50.0, 30.0, 15.0, 5.0], Bounds::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let fold = build_fold(&rects).unwrap();
        let root = fold.node(fold.root());
        assert_eq!(root.split, Axis::Horizontal);
        assert_eq!(root.children.len(), 2);
        assert_eq!(fold.node(root.children[0]).rect, Some(0));

        let inner = fold.node(root.children[1]);
        assert_eq!(inner.split, Axis::Vertical);
        assert_eq!(fold.node(inner.children[0]).rect, Some(1));
        let innermost = fold.node(inner.children[1]);
        assert_eq!(innermost.split, Axis::Horizontal);
        let leaves: Vec<_> = innermost.children.iter().map(|c| fold.node(*c).rect).collect();
        assert_eq!(leaves, vec![Some(2), Some(3)]);
        assert!((inner.bounds.width - 5.0).abs() < EPS);
        assert!((inner.bounds.height - 10.0).abs() < EPS);
        assert_well_formed(&fold);
    }

    #[test]
    fn alternates_for_many_sizes() {
        for (width, height) in [(10.0, 10.0), (16.0, 9.0), (3.0, 20.0)] {
            let raw: Vec<f64> = (1..=30).rev().map(|v| v as f64 * 1.7).collect();
            let sizes = normalize_sizes(&raw, width, height);
            let rects = squarify(&sizes, Bounds::new(0.0, 0.0, width, height)).unwrap();
            let fold = build_fold(&rects).unwrap();
            assert_well_formed(&fold);
            let leaves = fold.nodes().iter().filter(|n| n.is_leaf()).count();
            assert_eq!(leaves, rects.len());
            let root = fold.node(fold.root());
            assert!((root.bounds.area() - width * height).abs() < 1e-6);
        }
    }

    #[test]
    fn single_strip_becomes_the_root() {
        let rects = squarify(&[2.0, 2.0], Bounds::new(0.0, 0.0, 2.0, 2.0)).unwrap();
        assert!(rects.iter().all(|r| r.pass == 0));
        let fold = build_fold(&rects).unwrap();
        let root = fold.node(fold.root());
        assert_eq!(root.split, Axis::Vertical);
        assert_eq!(root.children.len(), 2);
        assert_well_formed(&fold);
    }

    #[test]
    fn splices_groups_sharing_the_parent_axis() {
        let rects = vec![
            rect(0.0, 0.0, 2.0, 2.0, Orientation::Row, 0),
            rect(0.0, 2.0, 2.0, 2.0, Orientation::Row, 0),
            rect(2.0, 0.0, 1.5, 4.0, Orientation::Column, 1),
            rect(3.5, 0.0, 1.5, 4.0, Orientation::Column, 1),
        ];
        let fold = build_fold(&rects).unwrap();
        let root = fold.node(fold.root());
        assert_eq!(root.split, Axis::Horizontal);
        assert_eq!(root.children.len(), 3);
        assert_eq!(fold.node(root.children[0]).split, Axis::Vertical);
        assert_eq!(fold.node(root.children[1]).rect, Some(2));
        assert_eq!(fold.node(root.children[2]).rect, Some(3));
        assert_well_formed(&fold);
    }

    #[test]
    fn single_rect_is_a_leaf_root() {
        let rects = vec![rect(0.0, 0.0, 4.0, 3.0, Orientation::Row, 0)];
        let fold = build_fold(&rects).unwrap();
        assert_eq!(fold.nodes().len(), 1);
        assert!(fold.node(0).is_leaf());
        assert!(build_fold(&[]).is_none());
    }
}
