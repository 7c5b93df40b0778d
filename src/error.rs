use crate::ir::ClusterId;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("canvas must have a positive finite size, got {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("weight scale must be a non-negative finite number, got {scale}")]
    InvalidWeightScale { scale: f64 },

    #[error("cluster {cluster} has non-positive size {size}")]
    NonPositiveSize { cluster: ClusterId, size: f64 },

    #[error("size #{index} is not positive: {size}")]
    InvalidSize { index: usize, size: f64 },

    #[error("sizes must be sorted in descending order (size #{index} grows)")]
    UnsortedSizes { index: usize },

    #[error("sizes sum to {actual} but the target rectangle has area {expected}")]
    AreaMismatch { expected: f64, actual: f64 },

    #[error("cluster {cluster} is declared more than once")]
    DuplicateCluster { cluster: ClusterId },

    #[error("unknown cluster {cluster} (referenced by {referenced_by})")]
    UnknownCluster {
        cluster: ClusterId,
        referenced_by: String,
    },

    #[error("edge references unknown node {node}")]
    UnknownNode { node: String },

    #[error("cluster hierarchy has no root")]
    NoRoot,

    #[error("cluster hierarchy has more than one root: {first} and {second}")]
    MultipleRoots { first: ClusterId, second: ClusterId },

    #[error("cluster {cluster} is part of a parent cycle")]
    Cycle { cluster: ClusterId },

    #[error("cluster {cluster} has no path to the root")]
    Orphan { cluster: ClusterId },

    #[error("internal defect: order model infeasible although the identity order fits")]
    Infeasible,

    #[error("solver failed: {0}")]
    Solver(String),

    #[error("solver status {status} carries no variable assignment")]
    MissingSolution { status: String },

    #[error("solved precedence values for node {node} do not form a total order")]
    InconsistentOrder { node: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_reads_as_an_internal_defect() {
        let message = LayoutError::Infeasible.to_string();
        assert!(message.starts_with("internal defect"));
        assert!(message.contains("identity order"));
    }
}
