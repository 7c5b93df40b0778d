//! Solver-neutral description of a mixed integer linear program. This is what
//! gets handed to a [`Solver`](super::Solver).

use std::fmt;

/// Handle to a variable of a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(usize);

impl Var {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Integer in `{0, 1}`.
    Binary,
    /// Continuous, bounded below by zero.
    NonNegative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
}

/// `Σ coefficient · var + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Var, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(var: Var, coefficient: f64) -> Self {
        Self {
            terms: vec![(var, coefficient)],
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, var: Var, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Adds `scale · other`.
    pub fn add_scaled(&mut self, other: &LinearExpr, scale: f64) {
        for &(var, coefficient) in &other.terms {
            self.add_term(var, coefficient * scale);
        }
        self.constant += other.constant * scale;
    }

    pub fn terms(&self) -> &[(Var, f64)] {
        &self.terms
    }

    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    /// Value of the expression under `values` (indexed by [`Var::index`]).
    /// Terms are summed in insertion order, so the result is reproducible.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (var, coefficient)| {
                acc + coefficient * values[var.index()]
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Le,
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmp::Eq => f.write_str("="),
            Cmp::Le => f.write_str("<="),
        }
    }
}

/// `expr (= | <=) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expr: LinearExpr,
    pub cmp: Cmp,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.cmp {
            Cmp::Eq => (lhs - self.rhs).abs() <= tolerance,
            Cmp::Le => lhs <= self.rhs + tolerance,
        }
    }
}

/// A minimization problem, optionally carrying a known feasible assignment
/// that solvers may use as their starting incumbent.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    hint: Option<Vec<f64>>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, name: impl Into<String>, kind: VarKind) -> Var {
        self.vars.push(VarDef {
            name: name.into(),
            kind,
        });
        Var(self.vars.len() - 1)
    }

    pub fn add_constraint(&mut self, expr: LinearExpr, cmp: Cmp, rhs: f64) {
        self.constraints.push(Constraint { expr, cmp, rhs });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn set_hint(&mut self, values: Vec<f64>) {
        self.hint = Some(values);
    }

    pub fn hint(&self) -> Option<&[f64]> {
        self.hint.as_deref()
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn var(&self, var: Var) -> &VarDef {
        &self.vars[var.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Whether `values` satisfies every bound and constraint within
    /// `tolerance`.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.vars.len() {
            return false;
        }
        let bounds_ok = self.vars.iter().zip(values).all(|(def, value)| match def.kind {
            VarKind::Binary => {
                value.abs() <= tolerance || (value - 1.0).abs() <= tolerance
            }
            VarKind::NonNegative => *value >= -tolerance,
        });
        bounds_ok
            && self
                .constraints
                .iter()
                .all(|constraint| constraint.is_satisfied_by(values, tolerance))
    }
}
