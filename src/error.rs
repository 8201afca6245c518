//! Error types for the ranking core
//!
//! The numeric core validates its inputs at the entry boundary and fails fast
//! instead of propagating NaN through the rank vector. I/O layers wrap these
//! into `anyhow::Error` with file context.

use crate::storage::NodeId;
use thiserror::Error;

/// Error type for transition-matrix construction and power iteration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// Graph has no nodes (`N == 0`)
    #[error("invalid graph size: a rank vector needs at least one node")]
    InvalidGraphSize,

    /// Vector length does not match the operator dimension
    #[error("dimension mismatch: expected length {expected}, got {actual}")]
    DimensionMismatch {
        /// Operator dimension (`N`)
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Dense matrix for `N` nodes would not fit in memory
    #[error("graph with {num_nodes} nodes is too large for a dense matrix; use the sparse operator")]
    GraphTooLarge {
        /// Number of nodes in the graph
        num_nodes: usize,
    },

    /// Adjacency references a node outside `[0, N)`
    #[error("node index {} out of bounds for graph with {num_nodes} nodes", .node.0)]
    NodeOutOfBounds {
        /// Offending node
        node: NodeId,
        /// Number of nodes in the graph
        num_nodes: usize,
    },

    /// Initial vector is not a probability distribution
    #[error("invalid initial vector: {0}")]
    InvalidInitialVector(String),

    /// Configuration parameter outside its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Product vector has no mass left to renormalize
    #[error("rank vector lost all probability mass; cannot renormalize")]
    ZeroMass,
}

/// Result type for the ranking core
pub type RankResult<T> = std::result::Result<T, RankError>;
