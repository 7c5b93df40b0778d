#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod order;
pub mod parser;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, SolverBackend, SolverConfig, load_config};
pub use error::{LayoutError, Result};
pub use ir::{ClusterId, GroupedGraph};
pub use layout::{Layout, compute_layout, solve_layout};
pub use order::{IdentitySolver, MicrolpSolver, SolveStatus, Solver};
