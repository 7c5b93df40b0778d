//! Sibling reordering as a mixed integer program.

pub mod model;
pub mod problem;
pub mod resolve;
pub mod solver;

pub use model::OrderModel;
pub use problem::Problem;
pub use resolve::{ResolvedTree, resolve};
pub use solver::{IdentitySolver, MicrolpSolver, SolveStatus, Solver, SolverOutcome};
