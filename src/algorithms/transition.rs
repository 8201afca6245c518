//! Random-surfer transition operators
//!
//! Column `col` of the transition matrix holds the distribution of the next
//! page for a surfer currently on page `col`:
//!
//! ```text
//! M[row][col] = TELEPORT + (BETA / outdeg(col) if col → row else 0)
//! TELEPORT    = (1 - BETA) / N
//! ```
//!
//! Two representations are provided. [`TransitionMatrix`] materializes all
//! `N²` entries. [`SparseTransition`] keeps only the link structure and
//! computes the same product as
//!
//! ```text
//! (M · r)[row] = BETA * Σ_{col → row} r[col] / outdeg(col)
//!              + TELEPORT * Σ r
//!              + BETA / N * Σ_{dangling col} r[col]     (Uniform policy only)
//! ```

use crate::config::{DanglingPolicy, RankConfig};
use crate::error::{RankError, RankResult};
use crate::storage::{LinkGraph, NodeId};
use rayon::prelude::*;

/// Linear operator applied once per power iteration
pub trait TransitionOperator {
    /// Dimension `N` of the (square) operator
    fn dim(&self) -> usize;

    /// Compute `output = M · input`
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if either slice length differs
    /// from [`dim`](Self::dim)
    fn apply(&self, input: &[f64], output: &mut [f64]) -> RankResult<()>;
}

fn check_dims(dim: usize, input: &[f64], output: &[f64]) -> RankResult<()> {
    for actual in [input.len(), output.len()] {
        if actual != dim {
            return Err(RankError::DimensionMismatch {
                expected: dim,
                actual,
            });
        }
    }
    Ok(())
}

/// Number of entries of a dense `n×n` matrix of `f64`
///
/// Errors instead of overflowing `usize` or exceeding the allocator's
/// `isize::MAX` byte limit.
fn dense_len(n: usize) -> RankResult<usize> {
    n.checked_mul(n)
        .filter(|len| {
            len.checked_mul(std::mem::size_of::<f64>())
                .is_some_and(|bytes| isize::try_from(bytes).is_ok())
        })
        .ok_or(RankError::GraphTooLarge { num_nodes: n })
}

/// Dense column-stochastic transition matrix (row-major)
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    entries: Vec<f64>,
    dim: usize,
}

impl TransitionMatrix {
    /// Build the `N×N` matrix for `graph`
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidGraphSize`] for an empty graph,
    /// [`RankError::GraphTooLarge`] when `N²` entries cannot be addressed and
    /// [`RankError::InvalidConfig`] for an out-of-range damping factor
    ///
    /// # Example
    ///
    /// ```
    /// use trueno_rank::{LinkGraph, NodeId, RankConfig, TransitionMatrix};
    ///
    /// let graph = LinkGraph::from_links(2, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(0))]).unwrap();
    /// let matrix = TransitionMatrix::build(&graph, &RankConfig::default()).unwrap();
    ///
    /// assert!((matrix.get(0, 1).unwrap() - 0.9).abs() < 1e-12);
    /// assert!((matrix.get(0, 0).unwrap() - 0.1).abs() < 1e-12);
    /// ```
    #[allow(clippy::cast_precision_loss)] // Dense matrices never approach 2^52 nodes
    pub fn build(graph: &LinkGraph, config: &RankConfig) -> RankResult<Self> {
        config.validate()?;
        let n = graph.num_nodes();
        if n == 0 {
            return Err(RankError::InvalidGraphSize);
        }

        let teleport = config.teleport(n);
        let mut entries = vec![teleport; dense_len(n)?];

        // Fill column by column from the forward CSR: col → row adds BETA/outdeg(col)
        let (row_offsets, col_indices) = graph.csr_components();
        for col in 0..n {
            let start = row_offsets[col] as usize;
            let end = row_offsets[col + 1] as usize;
            let targets = &col_indices[start..end];

            if targets.is_empty() {
                if config.dangling == DanglingPolicy::Uniform {
                    let share = config.damping / n as f64;
                    for row in 0..n {
                        entries[row * n + col] += share;
                    }
                }
                continue;
            }

            let share = config.damping / targets.len() as f64;
            for &row in targets {
                entries[row as usize * n + col] += share;
            }
        }

        Ok(Self { entries, dim: n })
    }

    /// Entry `M[row][col]`, `None` if either index is `>= dim()`
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.dim || col >= self.dim {
            return None;
        }
        Some(self.entries[row * self.dim + col])
    }

    /// Row `row` as a slice
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.entries.chunks_exact(self.dim).nth(row)
    }

    /// Sum of every column (all 1.0 when the matrix is column-stochastic)
    #[must_use]
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.dim];
        for row in self.entries.chunks_exact(self.dim) {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        sums
    }
}

impl TransitionOperator for TransitionMatrix {
    fn dim(&self) -> usize {
        self.dim
    }

    fn apply(&self, input: &[f64], output: &mut [f64]) -> RankResult<()> {
        check_dims(self.dim, input, output)?;

        output
            .par_iter_mut()
            .zip(self.entries.par_chunks_exact(self.dim))
            .for_each(|(out, row)| {
                *out = row.iter().zip(input).map(|(m, r)| m * r).sum();
            });

        Ok(())
    }
}

/// Implicit transition operator over the reverse CSR
///
/// Never materializes teleportation, so memory stays `O(N + E)` and dangling
/// columns never divide by a zero out-degree.
#[derive(Debug, Clone)]
pub struct SparseTransition<'a> {
    graph: &'a LinkGraph,
    /// `1 / outdeg(col)`, zero for dangling nodes
    inv_out_degree: Vec<f64>,
    dangling: Vec<NodeId>,
    damping: f64,
    teleport: f64,
    policy: DanglingPolicy,
}

impl<'a> SparseTransition<'a> {
    /// Prepare the operator for `graph`
    ///
    /// # Errors
    ///
    /// Same conditions as [`TransitionMatrix::build`]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(graph: &'a LinkGraph, config: &RankConfig) -> RankResult<Self> {
        config.validate()?;
        let n = graph.num_nodes();
        if n == 0 {
            return Err(RankError::InvalidGraphSize);
        }

        let inv_out_degree = graph
            .out_degrees()
            .into_iter()
            .map(|d| if d == 0 { 0.0 } else { 1.0 / d as f64 })
            .collect();

        Ok(Self {
            graph,
            inv_out_degree,
            dangling: graph.dangling_nodes(),
            damping: config.damping,
            teleport: config.teleport(n),
            policy: config.dangling,
        })
    }
}

impl TransitionOperator for SparseTransition<'_> {
    fn dim(&self) -> usize {
        self.graph.num_nodes()
    }

    #[allow(clippy::cast_precision_loss)]
    fn apply(&self, input: &[f64], output: &mut [f64]) -> RankResult<()> {
        let n = self.dim();
        check_dims(n, input, output)?;

        let total: f64 = input.iter().sum();
        let mut base = self.teleport * total;
        if self.policy == DanglingPolicy::Uniform {
            let dangling_mass: f64 = self.dangling.iter().map(|d| input[d.index()]).sum();
            base += self.damping * dangling_mass / n as f64;
        }

        let (rev_offsets, rev_indices) = self.graph.reverse_csr_components();
        output.par_iter_mut().enumerate().for_each(|(row, out)| {
            let start = rev_offsets[row] as usize;
            let end = rev_offsets[row + 1] as usize;
            let link_mass: f64 = rev_indices[start..end]
                .iter()
                .map(|&col| input[col as usize] * self.inv_out_degree[col as usize])
                .sum();
            *out = base + self.damping * link_mass;
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, pairs: &[(u32, u32)]) -> LinkGraph {
        let links: Vec<_> = pairs.iter().map(|&(s, d)| (NodeId(s), NodeId(d))).collect();
        LinkGraph::from_links(n, &links).unwrap()
    }

    fn star() -> LinkGraph {
        let pairs: Vec<_> = (1..10).map(|leaf| (0, leaf)).collect();
        graph(10, &pairs)
    }

    #[test]
    fn test_two_node_cycle_matrix() {
        let matrix =
            TransitionMatrix::build(&graph(2, &[(0, 1), (1, 0)]), &RankConfig::default()).unwrap();

        let expected = [[0.1, 0.9], [0.9, 0.1]];
        for (row, values) in expected.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                assert!(
                    (matrix.get(row, col).unwrap() - value).abs() < 1e-12,
                    "M[{row}][{col}] = {:?}",
                    matrix.get(row, col)
                );
            }
        }
    }

    #[test]
    fn test_columns_stochastic_without_dangling() {
        let matrix = TransitionMatrix::build(
            &graph(4, &[(0, 1), (0, 2), (1, 2), (2, 0), (3, 0), (3, 3)]),
            &RankConfig::default(),
        )
        .unwrap();

        for (col, sum) in matrix.column_sums().iter().enumerate() {
            assert!((sum - 1.0).abs() < 1e-9, "column {col} sums to {sum}");
        }
    }

    #[test]
    fn test_dangling_drop_leaks_damping_mass() {
        let matrix = TransitionMatrix::build(&star(), &RankConfig::default()).unwrap();
        let sums = matrix.column_sums();

        assert!((sums[0] - 1.0).abs() < 1e-9);
        for sum in &sums[1..] {
            // Teleport only: 10 * 0.02 = 0.2, missing 0.8
            assert!((sum - 0.2).abs() < 1e-9, "leaf column sums to {sum}");
        }
    }

    #[test]
    fn test_dangling_uniform_restores_stochastic() {
        let config = RankConfig::default().with_dangling(DanglingPolicy::Uniform);
        let matrix = TransitionMatrix::build(&star(), &config).unwrap();

        for sum in matrix.column_sums() {
            assert!((sum - 1.0).abs() < 1e-9);
        }
        // Leaf column: 0.02 teleport + 0.8 / 10
        assert!((matrix.get(0, 5).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_single_isolated_node() {
        let drop = TransitionMatrix::build(&graph(1, &[]), &RankConfig::default()).unwrap();
        assert!((drop.get(0, 0).unwrap() - 0.2).abs() < 1e-12);

        let uniform = TransitionMatrix::build(
            &graph(1, &[]),
            &RankConfig::default().with_dangling(DanglingPolicy::Uniform),
        )
        .unwrap();
        assert!((uniform.get(0, 0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let err = TransitionMatrix::build(&LinkGraph::new(), &RankConfig::default()).unwrap_err();
        assert_eq!(err, RankError::InvalidGraphSize);

        let err = SparseTransition::new(&LinkGraph::new(), &RankConfig::default()).unwrap_err();
        assert_eq!(err, RankError::InvalidGraphSize);
    }

    #[test]
    fn test_invalid_damping_rejected() {
        let err = TransitionMatrix::build(&star(), &RankConfig::default().with_damping(2.0))
            .unwrap_err();
        assert!(matches!(err, RankError::InvalidConfig(_)));
    }

    #[test]
    fn test_apply_dimension_mismatch() {
        let g = graph(3, &[(0, 1)]);
        let matrix = TransitionMatrix::build(&g, &RankConfig::default()).unwrap();
        let mut out = vec![0.0; 3];

        let err = matrix.apply(&[0.5, 0.5], &mut out).unwrap_err();
        assert_eq!(
            err,
            RankError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );

        let sparse = SparseTransition::new(&g, &RankConfig::default()).unwrap();
        let mut short = vec![0.0; 4];
        assert!(sparse.apply(&[0.2, 0.3, 0.5], &mut short).is_err());
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let g = graph(5, &[(0, 1), (0, 2), (1, 2), (2, 0), (2, 3), (4, 4)]);
        let input = [0.1, 0.3, 0.2, 0.25, 0.15];

        for policy in [DanglingPolicy::Drop, DanglingPolicy::Uniform] {
            let config = RankConfig::default().with_dangling(policy);
            let dense = TransitionMatrix::build(&g, &config).unwrap();
            let sparse = SparseTransition::new(&g, &config).unwrap();

            let mut a = vec![0.0; 5];
            let mut b = vec![0.0; 5];
            dense.apply(&input, &mut a).unwrap();
            sparse.apply(&input, &mut b).unwrap();

            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).abs() < 1e-12, "{policy:?}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn test_get_out_of_bounds() {
        let matrix =
            TransitionMatrix::build(&graph(2, &[(0, 1), (1, 0)]), &RankConfig::default()).unwrap();

        assert!(matrix.get(1, 1).is_some());
        assert_eq!(matrix.get(2, 0), None);
        assert_eq!(matrix.get(0, 2), None);
        assert_eq!(matrix.get(usize::MAX, usize::MAX), None);
    }

    #[test]
    fn test_dense_len_guards_overflow() {
        assert_eq!(dense_len(3), Ok(9));
        assert_eq!(
            dense_len(usize::MAX),
            Err(RankError::GraphTooLarge {
                num_nodes: usize::MAX
            })
        );
        // n² fits in usize but n² * 8 bytes does not fit in isize
        let n = 1_usize << (usize::BITS / 2 - 1);
        assert_eq!(
            dense_len(n),
            Err(RankError::GraphTooLarge { num_nodes: n })
        );
    }

    #[test]
    fn test_row_access() {
        let matrix =
            TransitionMatrix::build(&graph(2, &[(0, 1), (1, 0)]), &RankConfig::default()).unwrap();
        let row = matrix.row(1).unwrap();
        assert_eq!(row.len(), 2);
        assert!((row[0] - 0.9).abs() < 1e-12);
        assert!(matrix.row(2).is_none());
    }
}
