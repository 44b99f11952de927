//! Search configuration.
//!
//! All tunables live in one immutable [`SearchConfig`] constructed up front
//! and passed by reference; nothing in the engine mutates configuration
//! after the fact.

use serde::{Deserialize, Serialize};

/// One weight tuple of the Solomon I1 insertion criterion.
///
/// `c1 = alpha1 * (d(i,u) + d(u,j) - mu * d(i,j)) + alpha2 * push_forward`
/// scores a concrete insertion position; `c2 = lambda * d(0,u) - c1_best`
/// scores the customer for selection (larger is more urgent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsertionWeights {
    pub mu: f64,
    pub lambda: f64,
    pub alpha1: f64,
    pub alpha2: f64,
}

impl InsertionWeights {
    pub const fn new(mu: f64, lambda: f64, alpha1: f64, alpha2: f64) -> Self {
        Self {
            mu,
            lambda,
            alpha1,
            alpha2,
        }
    }

    /// The six standard weight tuples tried by the multi-start
    /// construction, covering distance-driven, time-driven, and mixed
    /// insertion criteria.
    pub const STANDARD: [InsertionWeights; 6] = [
        InsertionWeights::new(1.0, 1.0, 1.0, 0.0),
        InsertionWeights::new(1.0, 2.0, 1.0, 0.0),
        InsertionWeights::new(1.0, 1.0, 0.0, 1.0),
        InsertionWeights::new(1.0, 2.0, 0.0, 1.0),
        InsertionWeights::new(1.0, 1.0, 0.5, 0.5),
        InsertionWeights::new(1.0, 2.0, 0.5, 0.5),
    ];
}

/// Iteration budget for the improvement stage.
///
/// The iteration counter resets whenever an intensification pass reduces
/// the vehicle count, so `iterations` bounds the number of consecutive
/// non-improving cycles rather than total work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Outer iteration budget per run.
    pub iterations: usize,
    /// Intensification passes per outer iteration.
    pub intensification: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            iterations: 5000,
            intensification: 100,
        }
    }
}

/// Engine-wide tunables.
///
/// # Examples
///
/// ```
/// use multitrip::config::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.num_clusters_threshold, 10);
/// let reproducible = SearchConfig { seed: 42, ..SearchConfig::default() };
/// assert_eq!(reproducible.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Weight tuples tried by the multi-start construction.
    pub insertion_weights: Vec<InsertionWeights>,
    /// Upper bound on `k` in the cluster-and-merge multi-start
    /// (`k = 1..=num_clusters_threshold`).
    pub num_clusters_threshold: usize,
    /// Cap on departure-time branches explored per cluster level in the
    /// merge DFS.
    pub max_branch_departures: usize,
    /// Routes shorter than this many customers are dissolved and re-routed
    /// during the cluster-merge vehicle-reduction step.
    pub delta_threshold: usize,
    /// Random exchange attempts per weak perturbation, one run per value.
    pub perturbation_ladder: Vec<usize>,
    /// Minimum distance gain for a move to count in the distance-only
    /// post-pass.
    pub distance_gain_threshold: f64,
    /// RNG seed for reproducible perturbation.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            insertion_weights: InsertionWeights::STANDARD.to_vec(),
            num_clusters_threshold: 10,
            max_branch_departures: 3,
            delta_threshold: 3,
            perturbation_ladder: vec![10, 100],
            distance_gain_threshold: 0.01,
            seed: 0,
        }
    }
}
