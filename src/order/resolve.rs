//! Reads a solver assignment back into tree coordinates.

use tracing::{debug, warn};

use super::model::{NodeOrderVars, OrderModel};
use super::problem::VarKind;
use super::solver::{SolveStatus, SolverOutcome};
use crate::error::{LayoutError, Result};
use crate::layout::types::NestedTree;

/// The tree with final sibling order and coordinates.
#[derive(Debug, Clone)]
pub struct ResolvedTree {
    pub tree: NestedTree,
    pub status: SolveStatus,
    pub objective: f64,
}

/// Applies `outcome` to a copy of `tree`.
///
/// Binaries are rounded to the nearest integer. The rank of each child is the
/// number of siblings whose precedence variable says they come first; these
/// ranks must form a permutation. Coordinates come from evaluating the
/// model's origin expressions, so resolving the same outcome twice yields
/// identical trees.
pub fn resolve(
    tree: &NestedTree,
    model: &OrderModel,
    outcome: &SolverOutcome,
) -> Result<ResolvedTree> {
    let raw = match (outcome.status, outcome.values.as_deref()) {
        (SolveStatus::Infeasible, _) => return Err(LayoutError::Infeasible),
        (_, Some(values)) => values,
        (status, None) => {
            return Err(LayoutError::MissingSolution {
                status: status.to_string(),
            });
        }
    };
    let problem = model.problem();
    if raw.len() != problem.vars().len() {
        return Err(LayoutError::Solver(format!(
            "assignment has {} values for {} variables",
            raw.len(),
            problem.vars().len()
        )));
    }
    let values: Vec<f64> = raw
        .iter()
        .zip(problem.vars())
        .map(|(value, def)| match def.kind {
            VarKind::Binary => value.round().clamp(0.0, 1.0),
            VarKind::NonNegative => *value,
        })
        .collect();

    let mut resolved = tree.clone();
    for group in model.groups() {
        for (child, rank) in group.children.iter().zip(ranks(group, &values)?) {
            resolved.node_mut(*child).sibling_index = rank;
        }
    }
    for node in 0..tree.len() {
        let origin = model.origin(node);
        let x = origin.x.evaluate(&values);
        let y = origin.y.evaluate(&values);
        let target = resolved.node_mut(node);
        target.x = x;
        target.y = y;
    }

    let objective = model.objective_value(&values);
    debug!(status = %outcome.status, objective, "resolved sibling order");
    Ok(ResolvedTree {
        tree: resolved,
        status: outcome.status,
        objective,
    })
}

fn ranks(group: &NodeOrderVars, values: &[f64]) -> Result<Vec<usize>> {
    let n = group.children.len();
    let mut taken = vec![false; n];
    let mut out = Vec::with_capacity(n);
    for (j, &child) in group.children.iter().enumerate() {
        let rank = group
            .children
            .iter()
            .filter(|&&other| {
                group
                    .precedes(other, child)
                    .is_some_and(|var| values[var.index()] > 0.5)
            })
            .count();
        if taken[rank] {
            return Err(LayoutError::InconsistentOrder { node: group.node });
        }
        taken[rank] = true;

        let position = group
            .position
            .iter()
            .position(|row| values[row[j].index()] > 0.5);
        if position != Some(rank) {
            warn!(
                node = group.node,
                child,
                rank,
                ?position,
                "position variables disagree with precedence, using precedence"
            );
        }
        out.push(rank);
    }
    Ok(out)
}
