//! Estimator configuration: the knobs that bound the estimator's own work rather than
//! describing the MQ instance.

use std::collections::{BTreeMap, BTreeSet};

use crate::algorithms::AlgorithmKind;
use crate::instance::ProblemInstance;

/// Default cap on candidate points visited by one optimization.
pub const DEFAULT_MAX_EVALUATIONS: usize = 5_000_000;

#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Highest degree the series engine expands before giving up. Derived from the instance
    /// when unset.
    pub max_series_degree: Option<usize>,
    /// Largest parameter grid an optimization may sweep.
    pub max_evaluations: Option<usize>,
    /// Upper bounds for the outermost free parameter of individual algorithms
    /// (Crossbred's `D`, HybridF5's `k`, ...).
    pub outer_bounds: BTreeMap<AlgorithmKind, u64>,
    /// Algorithms the estimator does not construct at all.
    pub excluded: BTreeSet<AlgorithmKind>,
    /// Evaluate algorithms and parameter slices on the rayon pool.
    pub parallel: bool,
    /// Price exhaustive guessing with Grover search, `q^(k/2)` instead of `q^k`.
    pub quantum_search: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_series_degree: None,
            max_evaluations: Some(DEFAULT_MAX_EVALUATIONS),
            outer_bounds: BTreeMap::new(),
            excluded: BTreeSet::new(),
            parallel: true,
            quantum_search: false,
        }
    }
}

impl EstimatorConfig {
    pub fn with_outer_bound(mut self, kind: AlgorithmKind, bound: u64) -> Self {
        self.outer_bounds.insert(kind, bound);
        self
    }

    pub fn excluding(mut self, kind: AlgorithmKind) -> Self {
        self.excluded.insert(kind);
        self
    }

    pub fn with_max_series_degree(mut self, degree: usize) -> Self {
        self.max_series_degree = Some(degree);
        self
    }

    pub fn with_max_evaluations(mut self, cap: Option<usize>) -> Self {
        self.max_evaluations = cap;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_quantum_search(mut self) -> Self {
        self.quantum_search = true;
        self
    }

    pub fn outer_bound(&self, kind: AlgorithmKind) -> Option<u64> {
        self.outer_bounds.get(&kind).copied()
    }

    pub fn is_excluded(&self, kind: AlgorithmKind) -> bool {
        self.excluded.contains(&kind)
    }

    /// Degree cap for `instance`: explicit value, or `2(n + m) + 8` plus the excess of every
    /// equation degree over two.
    pub fn series_degree_for(&self, instance: &ProblemInstance) -> usize {
        self.max_series_degree.unwrap_or_else(|| {
            let excess: u64 = instance.degrees().iter().map(|d| d.saturating_sub(2)).sum();
            2 * (instance.nvariables() + instance.npolynomials()) + 8 + excess as usize
        })
    }
}
