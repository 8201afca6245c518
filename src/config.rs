//! Ranking parameters
//!
//! Damping, convergence tolerance and the iteration cap are explicit
//! parameters so tests can run the same graph under different tolerances.

use crate::error::{RankError, RankResult};

/// Default damping factor (probability of following a link)
pub const DEFAULT_DAMPING: f64 = 0.8;

/// Default L2 convergence threshold
pub const DEFAULT_MAX_DELTA: f64 = 0.0001;

/// Default hard cap on power iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// How a node without out-links contributes link mass
///
/// A dangling column has no link term in `M[row][col] = TELEPORT + BETA / outdeg(col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingPolicy {
    /// Dangling columns carry teleportation only (pseudorank).
    ///
    /// Each such column sums to `1 - damping`, so `M` is no longer
    /// column-stochastic. Per-iteration renormalization keeps the rank
    /// vector summing to 1, but the missing mass skews the result.
    #[default]
    Drop,

    /// Dangling columns link uniformly to every node (`damping / N` each).
    Uniform,
}

/// Representation of the transition operator used by the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorKind {
    /// Materialized `N×N` matrix, `O(N²)` memory
    #[default]
    Dense,

    /// CSR links plus a scalar teleport term, `O(N + E)` memory
    Sparse,
}

/// `PageRank` configuration
///
/// # Example
///
/// ```
/// use trueno_rank::{DanglingPolicy, RankConfig};
///
/// let config = RankConfig::default()
///     .with_damping(0.85)
///     .with_dangling(DanglingPolicy::Uniform);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RankConfig {
    /// Damping factor (BETA)
    pub damping: f64,
    /// L2 distance below which iteration stops
    pub max_delta: f64,
    /// Maximum number of power iterations
    pub max_iterations: usize,
    /// Dangling-node handling
    pub dangling: DanglingPolicy,
    /// Dense or sparse transition operator
    pub operator: OperatorKind,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            max_delta: DEFAULT_MAX_DELTA,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            dangling: DanglingPolicy::default(),
            operator: OperatorKind::default(),
        }
    }
}

impl RankConfig {
    /// Set the damping factor
    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the convergence threshold
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Set the iteration cap
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the dangling-node policy
    #[must_use]
    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }

    /// Set the operator representation
    #[must_use]
    pub fn with_operator(mut self, operator: OperatorKind) -> Self {
        self.operator = operator;
        self
    }

    /// Teleportation weight `(1 - damping) / N`
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Graphs >2^52 nodes unlikely
    pub fn teleport(&self, num_nodes: usize) -> f64 {
        (1.0 - self.damping) / num_nodes as f64
    }

    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidConfig`] if damping is outside `[0, 1]`
    /// or the threshold is negative or NaN.
    pub fn validate(&self) -> RankResult<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(RankError::InvalidConfig(format!(
                "damping must be in [0, 1], got {}",
                self.damping
            )));
        }
        if self.max_delta.is_nan() || self.max_delta < 0.0 {
            return Err(RankError::InvalidConfig(format!(
                "max_delta must be non-negative, got {}",
                self.max_delta
            )));
        }
        Ok(())
    }
}
