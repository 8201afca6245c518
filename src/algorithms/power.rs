//! Power iteration
//!
//! Based on Page et al. (1999) "The `PageRank` Citation Ranking: Bringing Order to the Web".
//!
//! Each step multiplies the current distribution by the transition operator,
//! renormalizes it to sum to 1 and stops once the L2 distance to the previous
//! distribution drops below the threshold. Hitting the iteration cap is a
//! normal, silent exit that returns the last vector.

use super::transition::{SparseTransition, TransitionMatrix, TransitionOperator};
use crate::config::{DanglingPolicy, OperatorKind, RankConfig};
use crate::error::{RankError, RankResult};
use crate::storage::{LinkGraph, NodeId};

/// Tolerance on the mass of a caller-supplied initial vector
const INITIAL_MASS_TOLERANCE: f64 = 1e-6;

/// Result of a `PageRank` computation
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// Scores for each node (indexed by node ID, sum = 1.0)
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// L2 delta of the last iteration
    pub delta: f64,
    /// Whether the delta fell below the threshold before the cap
    pub converged: bool,
}

impl PageRankResult {
    /// Get the score of a node
    #[must_use]
    pub fn score(&self, node: NodeId) -> Option<f64> {
        self.scores.get(node.index()).copied()
    }

    /// `(node, score)` pairs in node index order
    pub fn indexed(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.scores.iter().enumerate().map(|(idx, &score)| {
            #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
            (NodeId(idx as u32), score)
        })
    }
}

/// Uniform starting distribution `1/N`
///
/// # Errors
///
/// Returns [`RankError::InvalidGraphSize`] if `num_nodes == 0`
#[allow(clippy::cast_precision_loss)]
pub fn initial_ranks(num_nodes: usize) -> RankResult<Vec<f64>> {
    if num_nodes == 0 {
        return Err(RankError::InvalidGraphSize);
    }
    Ok(vec![1.0 / num_nodes as f64; num_nodes])
}

/// L2 distance between two equal-length vectors
#[must_use]
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Power-iteration solver
#[derive(Debug, Clone, Default)]
pub struct PowerIteration {
    config: RankConfig,
}

impl PowerIteration {
    /// Create a solver using `config`'s threshold and iteration cap
    #[must_use]
    pub fn new(config: RankConfig) -> Self {
        Self { config }
    }

    /// Solver configuration
    #[must_use]
    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Iterate `operator` starting from `initial`
    ///
    /// # Errors
    ///
    /// - [`RankError::InvalidConfig`] for an invalid configuration
    /// - [`RankError::DimensionMismatch`] if `initial.len() != operator.dim()`
    /// - [`RankError::InvalidInitialVector`] if `initial` is not a distribution
    /// - [`RankError::ZeroMass`] if a product vector sums to zero
    pub fn solve<M>(&self, operator: &M, initial: &[f64]) -> RankResult<PageRankResult>
    where
        M: TransitionOperator + ?Sized,
    {
        self.config.validate()?;
        let n = operator.dim();
        if n == 0 {
            return Err(RankError::InvalidGraphSize);
        }
        if initial.len() != n {
            return Err(RankError::DimensionMismatch {
                expected: n,
                actual: initial.len(),
            });
        }
        validate_distribution(initial)?;

        let mut ranks = initial.to_vec();
        let mut next = vec![0.0; n];
        let mut delta = f64::INFINITY;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            iterations += 1;

            operator.apply(&ranks, &mut next)?;

            let mass: f64 = next.iter().sum();
            if mass <= 0.0 || !mass.is_finite() {
                return Err(RankError::ZeroMass);
            }
            for value in &mut next {
                *value /= mass;
            }

            delta = l2_distance(&next, &ranks);
            log::debug!("iteration {iterations}: mass={mass:.12} delta={delta:.3e}");

            // `ranks` becomes the new vector; `next` is overwritten next round
            std::mem::swap(&mut ranks, &mut next);

            if delta < self.config.max_delta {
                converged = true;
                break;
            }
        }

        if converged {
            log::info!("PageRank converged after {iterations} iterations (delta={delta:.3e})");
        } else {
            log::info!(
                "PageRank stopped at the {} iteration cap without converging (delta={delta:.3e})",
                self.config.max_iterations
            );
        }

        Ok(PageRankResult {
            scores: ranks,
            iterations,
            delta,
            converged,
        })
    }
}

fn validate_distribution(vector: &[f64]) -> RankResult<()> {
    if let Some(bad) = vector.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(RankError::InvalidInitialVector(format!(
            "entries must be finite and non-negative, found {bad}"
        )));
    }
    let sum: f64 = vector.iter().sum();
    if (sum - 1.0).abs() > INITIAL_MASS_TOLERANCE {
        return Err(RankError::InvalidInitialVector(format!(
            "entries must sum to 1, got {sum}"
        )));
    }
    Ok(())
}

/// Compute `PageRank` scores for all nodes in the graph
///
/// Builds the operator selected by `config.operator` and iterates from the
/// uniform distribution.
///
/// # Algorithm
///
/// ```text
/// PR(u) = (1-β)/N + β * Σ(PR(v) / outdegree(v))
/// ```
///
/// Where:
/// - β = `config.damping` (0.8 by default)
/// - N = total number of nodes
/// - v = nodes with links to u
///
/// # Errors
///
/// Returns [`RankError::InvalidGraphSize`] for an empty graph and
/// [`RankError::InvalidConfig`] for an invalid configuration
///
/// # Example
///
/// ```
/// use trueno_rank::{pagerank, LinkGraph, NodeId, RankConfig};
///
/// let graph = LinkGraph::from_links(
///     3,
///     &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2)), (NodeId(2), NodeId(0))],
/// )
/// .unwrap();
///
/// let result = pagerank(&graph, &RankConfig::default()).unwrap();
/// assert_eq!(result.scores.len(), 3);
/// assert!((result.scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
/// ```
pub fn pagerank(graph: &LinkGraph, config: &RankConfig) -> RankResult<PageRankResult> {
    let initial = initial_ranks(graph.num_nodes())?;
    let solver = PowerIteration::new(config.clone());

    if config.dangling == DanglingPolicy::Drop {
        let dangling = graph.dangling_nodes().len();
        if dangling > 0 {
            log::warn!(
                "{dangling} dangling node(s) leak {:.3} of their mass each; \
                 result is renormalized pseudorank",
                config.damping
            );
        }
    }

    match config.operator {
        OperatorKind::Dense => {
            let matrix = TransitionMatrix::build(graph, config)?;
            solver.solve(&matrix, &initial)
        }
        OperatorKind::Sparse => {
            let operator = SparseTransition::new(graph, config)?;
            solver.solve(&operator, &initial)
        }
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
    fn test_initial_ranks() {
        let ranks = initial_ranks(7).unwrap();
        assert_eq!(ranks.len(), 7);
        assert!((ranks.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(initial_ranks(0).unwrap_err(), RankError::InvalidGraphSize);
    }

    #[test]
    fn test_l2_distance() {
        assert!((l2_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert!(l2_distance(&[0.5, 0.5], &[0.5, 0.5]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_two_node_cycle() {
        let result = pagerank(&graph(2, &[(0, 1), (1, 0)]), &RankConfig::default()).unwrap();

        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        for score in &result.scores {
            assert!((score - 0.5).abs() < 1e-12, "Score = {score}");
        }
    }

    #[test]
    fn test_single_isolated_node() {
        for policy in [DanglingPolicy::Drop, DanglingPolicy::Uniform] {
            let config = RankConfig::default().with_dangling(policy);
            let result = pagerank(&graph(1, &[]), &config).unwrap();

            assert!(result.converged);
            assert_eq!(result.iterations, 1);
            assert!((result.scores[0] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_star_graph_drop_policy() {
        let result = pagerank(&star(), &RankConfig::default()).unwrap();

        // Renormalization restores the total even though leaf columns leak 0.8
        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "Sum = {sum}");

        // Fixed point of r0 = 0.02 / (0.2 + 0.8 r0)
        let hub = (-0.2 + (0.04_f64 + 0.064).sqrt()) / 1.6;
        let leaf = (1.0 - hub) / 9.0;
        assert!((result.scores[0] - hub).abs() < 1e-3, "hub = {}", result.scores[0]);
        for &score in &result.scores[1..] {
            assert!((score - leaf).abs() < 1e-3, "leaf = {score}");
        }
    }

    #[test]
    fn test_star_graph_uniform_policy() {
        let config = RankConfig::default().with_dangling(DanglingPolicy::Uniform);
        let result = pagerank(&star(), &config).unwrap();

        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // Hub only receives teleport + dangling redistribution
        for &score in &result.scores[1..] {
            assert!(score > result.scores[0]);
        }
    }

    #[test]
    fn test_chain_sink_ranks_highest() {
        let config = RankConfig::default().with_dangling(DanglingPolicy::Uniform);
        let result = pagerank(&graph(3, &[(0, 1), (1, 2)]), &config).unwrap();

        assert!(result.scores[2] > result.scores[1]);
        assert!(result.scores[1] > result.scores[0]);
    }

    #[test]
    fn test_ring_is_uniform() {
        let pairs: Vec<_> = (0..10).map(|i| (i, (i + 1) % 10)).collect();
        let result = pagerank(&graph(10, &pairs), &RankConfig::default()).unwrap();

        for score in &result.scores {
            assert!((score - 0.1).abs() < 1e-9, "Score = {score}");
        }
    }

    #[test]
    fn test_max_iterations_returns_partial() {
        let config = RankConfig::default()
            .with_max_iterations(1)
            .with_max_delta(0.0); // Never converge

        let result = pagerank(&graph(3, &[(0, 1), (0, 2), (1, 2), (2, 0)]), &config).unwrap();

        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
        assert_eq!(result.scores.len(), 3);
        assert!((result.scores.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_iterations_returns_initial() {
        let config = RankConfig::default().with_max_iterations(0);
        let result = pagerank(&star(), &config).unwrap();

        assert_eq!(result.iterations, 0);
        assert!(!result.converged);
        assert_eq!(result.scores, vec![0.1; 10]);
    }

    #[test]
    fn test_dense_and_sparse_results_match() {
        let g = graph(6, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 0), (4, 3), (5, 5)]);
        for policy in [DanglingPolicy::Drop, DanglingPolicy::Uniform] {
            let base = RankConfig::default()
                .with_dangling(policy)
                .with_max_delta(1e-12)
                .with_max_iterations(500);
            let dense = pagerank(&g, &base.clone().with_operator(OperatorKind::Dense)).unwrap();
            let sparse = pagerank(&g, &base.with_operator(OperatorKind::Sparse)).unwrap();

            for (a, b) in dense.scores.iter().zip(&sparse.scores) {
                assert!((a - b).abs() < 1e-9, "{policy:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_round_trip_converges_immediately() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 1)]);
        let tight = RankConfig::default()
            .with_max_delta(1e-12)
            .with_max_iterations(1000);
        let first = pagerank(&g, &tight).unwrap();
        assert!(first.converged);

        let matrix = TransitionMatrix::build(&g, &RankConfig::default()).unwrap();
        let second = PowerIteration::new(RankConfig::default())
            .solve(&matrix, &first.scores)
            .unwrap();

        assert!(second.converged);
        assert_eq!(second.iterations, 1);
    }

    #[test]
    fn test_solve_rejects_wrong_length() {
        let matrix = TransitionMatrix::build(&star(), &RankConfig::default()).unwrap();
        let err = PowerIteration::default()
            .solve(&matrix, &[0.5, 0.5])
            .unwrap_err();
        assert_eq!(
            err,
            RankError::DimensionMismatch {
                expected: 10,
                actual: 2
            }
        );
    }

    #[test]
    fn test_solve_rejects_non_distribution() {
        let matrix =
            TransitionMatrix::build(&graph(2, &[(0, 1)]), &RankConfig::default()).unwrap();
        let solver = PowerIteration::default();

        assert!(matches!(
            solver.solve(&matrix, &[0.7, 0.7]),
            Err(RankError::InvalidInitialVector(_))
        ));
        assert!(matches!(
            solver.solve(&matrix, &[1.5, -0.5]),
            Err(RankError::InvalidInitialVector(_))
        ));
        assert!(matches!(
            solver.solve(&matrix, &[f64::NAN, 1.0]),
            Err(RankError::InvalidInitialVector(_))
        ));
    }

    #[test]
    fn test_all_dangling_full_damping_reports_zero_mass() {
        let config = RankConfig::default().with_damping(1.0);
        let err = pagerank(&graph(3, &[]), &config).unwrap_err();
        assert_eq!(err, RankError::ZeroMass);
    }

    #[test]
    fn test_result_accessors() {
        let result = pagerank(&graph(2, &[(0, 1), (1, 0)]), &RankConfig::default()).unwrap();

        assert!(result.score(NodeId(1)).is_some());
        assert!(result.score(NodeId(2)).is_none());
        let pairs: Vec<_> = result.indexed().map(|(node, _)| node).collect();
        assert_eq!(pairs, vec![NodeId(0), NodeId(1)]);
    }
}
