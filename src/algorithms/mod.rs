//! `PageRank` core: transition operators and power iteration
//!
//! Purely numeric, no I/O.

pub mod power;
pub mod transition;

pub use power::{initial_ranks, l2_distance, pagerank, PageRankResult, PowerIteration};
pub use transition::{SparseTransition, TransitionMatrix, TransitionOperator};
