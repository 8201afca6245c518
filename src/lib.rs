//! trueno-rank: random-surfer `PageRank` for web link graphs
//!
//! # Overview
//!
//! trueno-rank ranks the pages of a directed link graph by the stationary
//! distribution of a random surfer who follows a link with probability β
//! (damping) and teleports to a uniformly random page otherwise.
//!
//! # Quick Start
//!
//! ```
//! use trueno_rank::{pagerank, parse_graph, RankConfig, Ranking};
//!
//! # fn main() -> anyhow::Result<()> {
//! let graph = parse_graph("https://a.example\nhttps://b.example\n", "0 1\n1 0\n")?;
//!
//! let result = pagerank(&graph, &RankConfig::default())?;
//! assert!(result.converged);
//!
//! let ranking = Ranking::new(&graph, &result);
//! assert!((ranking.top(1)[0].score - 0.5).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Storage**: CSR link graph, plain-text loader, Parquet persistence
//! - **Algorithms**: dense or sparse transition operator + power iteration
//! - **Report**: label join, descending sort, fixed-width text layout

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod error;
pub mod report;
pub mod storage;

// Re-export core types
pub use algorithms::{
    initial_ranks, pagerank, PageRankResult, PowerIteration, SparseTransition, TransitionMatrix,
    TransitionOperator,
};
pub use config::{DanglingPolicy, OperatorKind, RankConfig};
pub use error::{RankError, RankResult};
pub use report::{RankedNode, Ranking};
pub use storage::{load_text_graph, parse_graph, LinkGraph, NodeId};

// Error type for the I/O layers
pub use anyhow::{Error, Result};
