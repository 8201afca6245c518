//! CSR (Compressed Sparse Row) link graph
//!
//! Based on `GraphBLAST` (Yang et al., ACM `ToMS` 2022) sparse layouts.
//!
//! # CSR Format
//!
//! ```text
//! Links: 0 → 1, 0 → 2, 1 → 2   (N = 4, node 3 has no links)
//!
//! Forward CSR (out-links):
//!   row_offsets: [0, 2, 3, 3, 3]
//!   col_indices: [1, 2, 2]
//!
//! Reverse CSR (in-links):
//!   rev_row_offsets: [0, 0, 1, 3, 3]
//!   rev_col_indices: [0, 0, 1]
//! ```
//!
//! Out-links of a node form a *set*: duplicate links collapse and targets are
//! kept sorted, so the out-degree is the number of distinct targets.

use crate::error::{RankError, RankResult};
use std::collections::HashMap;

/// Node identifier (zero-indexed position in every rank vector)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in vectors and matrices
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Directed link graph with a fixed node count
///
/// Optimized for:
/// - O(1) access to out-links (forward CSR)
/// - O(1) access to in-links (reverse CSR, drives the sparse product)
/// - O(log d) link membership tests
///
/// # Example
///
/// ```
/// use trueno_rank::{LinkGraph, NodeId};
///
/// let graph = LinkGraph::from_links(3, &[(NodeId(0), NodeId(1)), (NodeId(0), NodeId(2))]).unwrap();
///
/// assert_eq!(graph.out_links(NodeId(0)).unwrap(), &[1, 2]);
/// assert_eq!(graph.out_degree(NodeId(2)).unwrap(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct LinkGraph {
    /// Forward CSR: node i's out-links start at `row_offsets`[i]
    /// Length: `num_nodes` + 1
    row_offsets: Vec<u32>,

    /// Forward CSR: link targets, sorted and unique per node
    /// Length: `num_links`
    col_indices: Vec<u32>,

    /// Reverse CSR: node i's in-links start at `rev_row_offsets`[i]
    /// Length: `num_nodes` + 1
    rev_row_offsets: Vec<u32>,

    /// Reverse CSR: link sources
    /// Length: `num_links`
    rev_col_indices: Vec<u32>,

    /// Node labels (URLs for web graphs)
    labels: HashMap<NodeId, String>,

    /// Number of nodes
    num_nodes: usize,
}

impl LinkGraph {
    /// Create an empty graph with no nodes
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_offsets: vec![0],
            col_indices: Vec::new(),
            rev_row_offsets: vec![0],
            rev_col_indices: Vec::new(),
            labels: HashMap::new(),
            num_nodes: 0,
        }
    }

    /// Create graph with `num_nodes` nodes from a link list
    ///
    /// Nodes without links are kept (they are dangling and/or unreachable,
    /// but still receive teleportation mass).
    ///
    /// # Errors
    ///
    /// Returns [`RankError::NodeOutOfBounds`] if a link endpoint is `>= num_nodes`
    pub fn from_links(num_nodes: usize, links: &[(NodeId, NodeId)]) -> RankResult<Self> {
        for &(src, dst) in links {
            for node in [src, dst] {
                if node.index() >= num_nodes {
                    return Err(RankError::NodeOutOfBounds {
                        node,
                        num_nodes,
                    });
                }
            }
        }

        // Build adjacency lists (temporary) for both forward and reverse
        let mut adj_list: Vec<Vec<u32>> = vec![Vec::new(); num_nodes];
        for (src, dst) in links {
            adj_list[src.index()].push(dst.0);
        }
        for targets in &mut adj_list {
            targets.sort_unstable();
            targets.dedup();
        }

        let mut rev_adj_list: Vec<Vec<u32>> = vec![Vec::new(); num_nodes];
        for (src, targets) in adj_list.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)] // Bounded by u32 NodeIds above
            let src = src as u32;
            for &dst in targets {
                rev_adj_list[dst as usize].push(src);
            }
        }

        let (row_offsets, col_indices) = flatten(&adj_list);
        let (rev_row_offsets, rev_col_indices) = flatten(&rev_adj_list);

        Ok(Self {
            row_offsets,
            col_indices,
            rev_row_offsets,
            rev_col_indices,
            labels: HashMap::new(),
            num_nodes,
        })
    }

    /// Create graph whose node count and labels come from `labels`
    ///
    /// Node `i` gets `labels[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::NodeOutOfBounds`] if a link endpoint is `>= labels.len()`
    pub fn from_labeled_links(labels: Vec<String>, links: &[(NodeId, NodeId)]) -> RankResult<Self> {
        let mut graph = Self::from_links(labels.len(), links)?;
        for (idx, label) in labels.into_iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
            graph.set_label(NodeId(idx as u32), label);
        }
        Ok(graph)
    }

    /// Get out-link targets of a node (sorted, unique)
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn out_links(&self, node: NodeId) -> RankResult<&[u32]> {
        let idx = self.check(node)?;
        let start = self.row_offsets[idx] as usize;
        let end = self.row_offsets[idx + 1] as usize;

        Ok(&self.col_indices[start..end])
    }

    /// Get in-link sources of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn in_links(&self, node: NodeId) -> RankResult<&[u32]> {
        let idx = self.check(node)?;
        let start = self.rev_row_offsets[idx] as usize;
        let end = self.rev_row_offsets[idx + 1] as usize;

        Ok(&self.rev_col_indices[start..end])
    }

    /// Number of distinct out-link targets
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn out_degree(&self, node: NodeId) -> RankResult<usize> {
        self.out_links(node).map(<[u32]>::len)
    }

    /// Whether `src` links to `dst`
    ///
    /// # Errors
    ///
    /// Returns error if either node ID is out of bounds
    pub fn links_to(&self, src: NodeId, dst: NodeId) -> RankResult<bool> {
        self.check(dst)?;
        Ok(self.out_links(src)?.binary_search(&dst.0).is_ok())
    }

    /// Out-degree of every node, indexed by node
    #[must_use]
    pub fn out_degrees(&self) -> Vec<usize> {
        self.row_offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .collect()
    }

    /// Nodes with no out-links
    #[must_use]
    pub fn dangling_nodes(&self) -> Vec<NodeId> {
        self.row_offsets
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] == w[1])
            .map(|(idx, _)| {
                #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
                NodeId(idx as u32)
            })
            .collect()
    }

    /// Iterate over all links as `(source, target)` in source order
    pub fn iter_links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        (0..self.num_nodes).flat_map(move |src| {
            let start = self.row_offsets[src] as usize;
            let end = self.row_offsets[src + 1] as usize;

            #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
            let src = NodeId(src as u32);
            self.col_indices[start..end]
                .iter()
                .map(move |&dst| (src, NodeId(dst)))
        })
    }

    /// Set node label
    pub fn set_label(&mut self, node: NodeId, label: String) {
        self.labels.insert(node, label);
    }

    /// Get node label
    #[must_use]
    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(&node).map(String::as_str)
    }

    /// Get number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of distinct links
    #[must_use]
    pub fn num_links(&self) -> usize {
        self.col_indices.len()
    }

    /// Get forward CSR components `(row_offsets, col_indices)`
    #[must_use]
    pub fn csr_components(&self) -> (&[u32], &[u32]) {
        (&self.row_offsets, &self.col_indices)
    }

    /// Get reverse CSR components `(rev_row_offsets, rev_col_indices)`
    #[must_use]
    pub fn reverse_csr_components(&self) -> (&[u32], &[u32]) {
        (&self.rev_row_offsets, &self.rev_col_indices)
    }

    fn check(&self, node: NodeId) -> RankResult<usize> {
        if node.index() >= self.num_nodes {
            return Err(RankError::NodeOutOfBounds {
                node,
                num_nodes: self.num_nodes,
            });
        }
        Ok(node.index())
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten per-node neighbor lists into `(offsets, indices)`
fn flatten(adj_list: &[Vec<u32>]) -> (Vec<u32>, Vec<u32>) {
    let mut offsets = Vec::with_capacity(adj_list.len() + 1);
    let mut indices = Vec::with_capacity(adj_list.iter().map(Vec::len).sum());

    let mut offset = 0_u32;
    offsets.push(offset);

    for neighbors in adj_list {
        #[allow(clippy::cast_possible_truncation)] // Graphs >4B links not supported yet
        let len_u32 = neighbors.len() as u32;
        offset += len_u32;
        offsets.push(offset);
        indices.extend_from_slice(neighbors);
    }

    (offsets, indices)
}
