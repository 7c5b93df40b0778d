//! The sibling-order integer program.
//!
//! For every tree node `k` with `n_k >= 2` children:
//!
//! * `x[i,j,k]` (binary): child `j` occupies position `i` (1-based);
//! * `l[a,b,k]` (binary): child `a` precedes child `b`.
//!
//! Each child takes exactly one position and each position exactly one child;
//! `l[a,b,k] + l[b,a,k] = 1`; and with `pos(j,k) = Σ_i i·x[i,j,k]` the
//! linking constraint `pos(b,k) - pos(a,k) - n_k·l[a,b,k] <= 0` forces
//! `l[a,b,k] = 1` whenever `b` comes after `a`.
//!
//! A node's origin is the canvas origin plus, for every ancestor `g` (itself
//! included, root excluded), the extents of the siblings that precede `g`
//! along the parent's split axis. For each pair of leaves the signed gap
//! between their centres is split into two non-negative parts
//! `d[p,q] - d[q,p] = c(p) - c(q)`, and the objective is
//! `Σ_{p≠q} w(p,q)·(d_x[p,q] + d_y[p,q])`.

use std::collections::BTreeMap;

use tracing::debug;

use super::problem::{Cmp, LinearExpr, Problem, Var, VarKind};
use crate::layout::cluster_graph::ClusterGraph;
use crate::layout::types::{Axis, NestedTree, NodeId};

/// Ordering variables of one sibling group.
#[derive(Debug, Clone)]
pub struct NodeOrderVars {
    pub node: NodeId,
    pub children: Vec<NodeId>,
    /// `position[i][j]`: `children[j]` sits at position `i + 1`.
    pub position: Vec<Vec<Var>>,
    pub precedence: BTreeMap<(NodeId, NodeId), Var>,
    pub big_m: f64,
}

impl NodeOrderVars {
    /// The variable that is 1 when `a` precedes `b`.
    pub fn precedes(&self, a: NodeId, b: NodeId) -> Option<Var> {
        self.precedence.get(&(a, b)).copied()
    }

    /// `pos(children[j]) = Σ_i (i + 1)·x[i, j]`.
    pub fn position_expr(&self, j: usize) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (i, row) in self.position.iter().enumerate() {
            expr.add_term(row[j], (i + 1) as f64);
        }
        expr
    }
}

#[derive(Debug, Clone, Default)]
pub struct Point {
    pub x: LinearExpr,
    pub y: LinearExpr,
}

#[derive(Debug, Clone, Copy)]
pub struct DistanceVars {
    pub dx: Var,
    pub dy: Var,
}

/// The integer program for one nested tree. Built once and consumed by one
/// solver call.
#[derive(Debug, Clone)]
pub struct OrderModel {
    problem: Problem,
    groups: BTreeMap<NodeId, NodeOrderVars>,
    origins: Vec<Point>,
    leaves: Vec<NodeId>,
    distances: BTreeMap<(NodeId, NodeId), DistanceVars>,
}

impl OrderModel {
    pub fn build(tree: &NestedTree, weights: &ClusterGraph) -> Self {
        let mut problem = Problem::new();
        let mut groups = BTreeMap::new();
        for node in tree.branching_nodes() {
            let vars = add_sibling_group(&mut problem, node, &tree.node(node).children);
            groups.insert(node, vars);
        }

        let origins: Vec<Point> = (0..tree.len())
            .map(|node| fold_origin(tree, &groups, node))
            .collect();

        let leaves = tree.leaves();
        let mut distances = BTreeMap::new();
        for &p in &leaves {
            for &q in &leaves {
                if p == q {
                    continue;
                }
                let dx = problem.add_var(format!("d_x[{p},{q}]"), VarKind::NonNegative);
                let dy = problem.add_var(format!("d_y[{p},{q}]"), VarKind::NonNegative);
                distances.insert((p, q), DistanceVars { dx, dy });
            }
        }

        let centers: BTreeMap<NodeId, Point> = leaves
            .iter()
            .map(|&leaf| {
                let node = tree.node(leaf);
                let mut center = origins[leaf].clone();
                center.x.add_constant(node.width / 2.0);
                center.y.add_constant(node.height / 2.0);
                (leaf, center)
            })
            .collect();

        for (i, &p) in leaves.iter().enumerate() {
            for &q in &leaves[i + 1..] {
                let forward = distances[&(p, q)];
                let backward = distances[&(q, p)];
                for axis in [Axis::Horizontal, Axis::Vertical] {
                    let (d_pq, d_qp, c_p, c_q) = match axis {
                        Axis::Horizontal => {
                            (forward.dx, backward.dx, &centers[&p].x, &centers[&q].x)
                        }
                        Axis::Vertical => {
                            (forward.dy, backward.dy, &centers[&p].y, &centers[&q].y)
                        }
                    };
                    let mut expr = LinearExpr::term(d_pq, 1.0);
                    expr.add_term(d_qp, -1.0);
                    expr.add_scaled(c_p, -1.0);
                    expr.add_scaled(c_q, 1.0);
                    problem.add_constraint(expr, Cmp::Eq, 0.0);
                }
            }
        }

        let mut objective = LinearExpr::new();
        for (&(p, q), vars) in &distances {
            let (Some(a), Some(b)) = (tree.node(p).cluster, tree.node(q).cluster) else {
                continue;
            };
            let weight = weights.weight(a, b);
            if weight == 0.0 {
                continue;
            }
            objective.add_term(vars.dx, weight);
            objective.add_term(vars.dy, weight);
        }
        problem.set_objective(objective);

        debug!(
            groups = groups.len(),
            leaves = leaves.len(),
            variables = problem.vars().len(),
            constraints = problem.constraints().len(),
            "built order model"
        );

        let mut model = Self {
            problem,
            groups,
            origins,
            leaves,
            distances,
        };
        let start = model.identity_assignment(tree);
        model.problem.set_hint(start);
        model
    }

    /// The assignment that keeps every sibling group in its current order,
    /// which reproduces the squarified partition. Always feasible.
    pub fn identity_assignment(&self, tree: &NestedTree) -> Vec<f64> {
        let mut values = vec![0.0; self.problem.vars().len()];
        for group in self.groups.values() {
            for (i, row) in group.position.iter().enumerate() {
                values[row[i].index()] = 1.0;
            }
            for (ia, a) in group.children.iter().enumerate() {
                for b in &group.children[ia + 1..] {
                    values[group.precedence[&(*a, *b)].index()] = 1.0;
                }
            }
        }
        let centers: BTreeMap<NodeId, (f64, f64)> = self
            .leaves
            .iter()
            .map(|&leaf| {
                let node = tree.node(leaf);
                let origin = &self.origins[leaf];
                let x = origin.x.evaluate(&values) + node.width / 2.0;
                let y = origin.y.evaluate(&values) + node.height / 2.0;
                (leaf, (x, y))
            })
            .collect();
        for (&(p, q), vars) in &self.distances {
            let (px, py) = centers[&p];
            let (qx, qy) = centers[&q];
            values[vars.dx.index()] = (px - qx).max(0.0);
            values[vars.dy.index()] = (py - qy).max(0.0);
        }
        values
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn group(&self, node: NodeId) -> Option<&NodeOrderVars> {
        self.groups.get(&node)
    }

    pub fn groups(&self) -> impl Iterator<Item = &NodeOrderVars> {
        self.groups.values()
    }

    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Origin (top-left corner) of `node` as an expression over the
    /// precedence variables.
    pub fn origin(&self, node: NodeId) -> &Point {
        &self.origins[node]
    }

    pub fn distance(&self, p: NodeId, q: NodeId) -> Option<DistanceVars> {
        self.distances.get(&(p, q)).copied()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.problem.objective().evaluate(values)
    }
}

fn add_sibling_group(problem: &mut Problem, node: NodeId, children: &[NodeId]) -> NodeOrderVars {
    let n = children.len();
    let big_m = n as f64;

    let mut position = Vec::with_capacity(n);
    for i in 1..=n {
        let row: Vec<Var> = children
            .iter()
            .map(|child| problem.add_var(format!("x[{i},{child},{node}]"), VarKind::Binary))
            .collect();
        position.push(row);
    }

    let mut precedence = BTreeMap::new();
    for &a in children {
        for &b in children {
            if a != b {
                let var = problem.add_var(format!("l[{a},{b},{node}]"), VarKind::Binary);
                precedence.insert((a, b), var);
            }
        }
    }

    let vars = NodeOrderVars {
        node,
        children: children.to_vec(),
        position,
        precedence,
        big_m,
    };

    for j in 0..n {
        let mut expr = LinearExpr::new();
        for row in &vars.position {
            expr.add_term(row[j], 1.0);
        }
        problem.add_constraint(expr, Cmp::Eq, 1.0);
    }
    for row in &vars.position {
        let mut expr = LinearExpr::new();
        for &var in row {
            expr.add_term(var, 1.0);
        }
        problem.add_constraint(expr, Cmp::Eq, 1.0);
    }

    for (ia, &a) in children.iter().enumerate() {
        for (ib, &b) in children.iter().enumerate() {
            if ia == ib {
                continue;
            }
            let l_ab = vars.precedence[&(a, b)];
            if ia < ib {
                let mut expr = LinearExpr::term(l_ab, 1.0);
                expr.add_term(vars.precedence[&(b, a)], 1.0);
                problem.add_constraint(expr, Cmp::Eq, 1.0);
            }
            let mut expr = vars.position_expr(ib);
            expr.add_scaled(&vars.position_expr(ia), -1.0);
            expr.add_term(l_ab, -big_m);
            problem.add_constraint(expr, Cmp::Le, 0.0);
        }
    }
    vars
}

fn fold_origin(
    tree: &NestedTree,
    groups: &BTreeMap<NodeId, NodeOrderVars>,
    node: NodeId,
) -> Point {
    let root = tree.node(tree.root());
    let mut origin = Point {
        x: LinearExpr::constant(root.x),
        y: LinearExpr::constant(root.y),
    };
    for term in tree.folding_terms(node) {
        let Some(var) = groups
            .get(&term.parent)
            .and_then(|group| group.precedes(term.sibling, term.target))
        else {
            continue;
        };
        match term.axis {
            Axis::Horizontal => origin.x.add_term(var, term.extent),
            Axis::Vertical => origin.y.add_term(var, term.extent),
        }
    }
    origin
}
