//! Graph storage layer
//!
//! Provides the CSR link graph, plain-text loading and Parquet persistence.

pub mod csr;
pub mod loader;
#[cfg(feature = "storage")]
pub mod parquet;

pub use csr::{LinkGraph, NodeId};
pub use loader::{load_text_graph, parse_graph, parse_links, parse_nodes};
