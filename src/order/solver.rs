//! Solver backends for the order model.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use microlp::{
    ComparisonOp, OptimizationDirection, SolveOptions, SolveOutcome, TerminationReason, Variable,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::problem::{Cmp, LinearExpr, Problem, VarKind};
use crate::error::{LayoutError, Result};

/// Tolerance used when checking a starting assignment.
const HINT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Timeout,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Result of one solver call. `values` is indexed by variable index and is
/// present whenever the solver has an assignment to report.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    pub values: Option<Vec<f64>>,
}

impl SolverOutcome {
    pub fn optimal(values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Optimal,
            values: Some(values),
        }
    }

    pub fn feasible(values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Feasible,
            values: Some(values),
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: None,
        }
    }

    pub fn timeout(values: Option<Vec<f64>>) -> Self {
        Self {
            status: SolveStatus::Timeout,
            values,
        }
    }

    /// Whether the outcome carries an assignment the layout can be read from.
    pub fn has_assignment(&self) -> bool {
        matches!(
            self.status,
            SolveStatus::Optimal | SolveStatus::Feasible | SolveStatus::Timeout
        ) && self.values.is_some()
    }
}

/// Anything that can minimize a [`Problem`].
pub trait Solver {
    fn name(&self) -> &str;

    /// Solves `problem`, spending at most `time_limit` where the backend
    /// supports a limit.
    fn submit(&self, problem: &Problem, time_limit: Duration) -> Result<SolverOutcome>;
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn submit(&self, problem: &Problem, time_limit: Duration) -> Result<SolverOutcome> {
        (**self).submit(problem, time_limit)
    }
}

/// Branch and bound through the pure Rust `microlp` solver.
///
/// The time limit is handed to `microlp`. When it fires, the best incumbent
/// is returned as a timeout; without one, the problem's starting assignment
/// stands in for it. The starting assignment also seeds the search.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver;

impl Solver for MicrolpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn submit(&self, problem: &Problem, time_limit: Duration) -> Result<SolverOutcome> {
        if problem.is_empty() {
            return Ok(SolverOutcome::optimal(Vec::new()));
        }
        let started = Instant::now();

        let objective = merged_terms(problem.objective());
        let mut model = microlp::Problem::new(OptimizationDirection::Minimize);
        let handles: Vec<Variable> = problem
            .vars()
            .iter()
            .enumerate()
            .map(|(index, def)| {
                let cost = objective.get(&index).copied().unwrap_or(0.0);
                match def.kind {
                    VarKind::Binary => model.add_binary_var(cost),
                    VarKind::NonNegative => model.add_var(cost, (0.0, f64::INFINITY)),
                }
            })
            .collect();
        for constraint in problem.constraints() {
            let lhs: Vec<(Variable, f64)> = merged_terms(&constraint.expr)
                .into_iter()
                .map(|(index, coefficient)| (handles[index], coefficient))
                .collect();
            let rhs = constraint.rhs - constraint.expr.constant_part();
            let op = match constraint.cmp {
                Cmp::Eq => ComparisonOp::Eq,
                Cmp::Le => ComparisonOp::Le,
            };
            model.add_constraint(lhs, op, rhs);
        }

        let mut options = SolveOptions::default();
        options.time_limit = Some(time_limit);
        options.warm_start = problem
            .hint()
            .map(|hint| handles.iter().copied().zip(hint.iter().copied()).collect());

        debug!(
            variables = handles.len(),
            constraints = problem.constraints().len(),
            limit_ms = time_limit.as_millis() as u64,
            "invoking microlp"
        );
        let outcome = match model.solve_with(options) {
            Ok(SolveOutcome::Solution(solution)) => {
                let values: Vec<f64> = handles
                    .iter()
                    .map(|var| solution.var_value_raw(*var))
                    .collect();
                match solution.termination_reason() {
                    TerminationReason::ProvenOptimal => SolverOutcome::optimal(values),
                    TerminationReason::TimeLimit => SolverOutcome::timeout(Some(values)),
                    _ => SolverOutcome::feasible(values),
                }
            }
            Ok(SolveOutcome::Interrupted(_)) => {
                warn!("microlp stopped before finding an incumbent, keeping the starting order");
                let fallback = problem
                    .hint()
                    .filter(|hint| problem.is_feasible(hint, HINT_TOLERANCE))
                    .map(<[f64]>::to_vec);
                SolverOutcome::timeout(fallback)
            }
            Err(microlp::Error::Infeasible) => SolverOutcome::infeasible(),
            Err(err) => return Err(LayoutError::Solver(err.to_string())),
        };

        info!(
            status = %outcome.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "order model solved"
        );
        Ok(outcome)
    }
}

/// Coefficients per variable index, with repeated variables summed and
/// cancelled terms dropped.
fn merged_terms(expr: &LinearExpr) -> BTreeMap<usize, f64> {
    let mut merged = BTreeMap::new();
    for &(var, coefficient) in expr.terms() {
        *merged.entry(var.index()).or_insert(0.0) += coefficient;
    }
    merged.retain(|_, coefficient| *coefficient != 0.0);
    merged
}

/// Returns the problem's starting assignment unchanged. With the order model
/// this keeps the squarified arrangement as it was built.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySolver;

impl Solver for IdentitySolver {
    fn name(&self) -> &str {
        "identity"
    }

    fn submit(&self, problem: &Problem, _time_limit: Duration) -> Result<SolverOutcome> {
        if problem.is_empty() {
            return Ok(SolverOutcome::optimal(Vec::new()));
        }
        let Some(hint) = problem.hint() else {
            return Err(LayoutError::Solver(
                "identity solver needs a starting assignment".to_string(),
            ));
        };
        if !problem.is_feasible(hint, HINT_TOLERANCE) {
            return Ok(SolverOutcome::infeasible());
        }
        Ok(SolverOutcome::feasible(hint.to_vec()))
    }
}
