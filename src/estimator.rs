//! The aggregator: one [`Algorithm`] per strategy over a shared [`ProblemInstance`], with
//! memoized optima, ranking and report generation.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::algorithms::{Algorithm, AlgorithmKind, TimeMeasure};
use crate::config::EstimatorConfig;
use crate::error::{EstimatorError, Result};
use crate::instance::ProblemInstance;
use crate::optimizer::OptimizationResult;
use crate::report::{EstimatorReport, ReportFailure, ReportRow};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EstimatorState {
    /// No algorithm has been optimized yet.
    Unevaluated,
    /// At least one optimum is cached.
    Evaluated,
}

#[derive(Debug)]
pub struct Estimator {
    instance: Arc<ProblemInstance>,
    config: EstimatorConfig,
    algorithms: Vec<Algorithm>,
}

impl Estimator {
    /// Estimator over every algorithm with the default configuration.
    pub fn new(instance: ProblemInstance) -> Self {
        Self::with_config(instance, EstimatorConfig::default())
    }

    pub fn with_config(instance: ProblemInstance, config: EstimatorConfig) -> Self {
        let instance = Arc::new(instance);
        let algorithms = AlgorithmKind::ALL
            .into_iter()
            .filter(|kind| !config.is_excluded(*kind))
            .map(|kind| Algorithm::new(kind, instance.clone(), &config))
            .collect();
        Self {
            instance,
            config,
            algorithms,
        }
    }

    /// Validates `(q, n, m)` with default constants and builds the estimator.
    pub fn from_parameters(q: u64, nvariables: usize, npolynomials: usize) -> Result<Self> {
        Ok(Self::new(ProblemInstance::new(q, nvariables, npolynomials)?))
    }

    pub fn instance(&self) -> &ProblemInstance {
        &self.instance
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Every constructed algorithm, in declaration order.
    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn applicable_algorithms(&self) -> impl Iterator<Item = &Algorithm> {
        self.algorithms.iter().filter(|a| a.is_applicable())
    }

    pub fn algorithm(&self, kind: AlgorithmKind) -> Option<&Algorithm> {
        self.algorithms.iter().find(|a| a.kind() == kind)
    }

    pub fn state(&self) -> EstimatorState {
        if self.algorithms.iter().any(Algorithm::is_optimized) {
            EstimatorState::Evaluated
        } else {
            EstimatorState::Unevaluated
        }
    }

    /// Optimum of one algorithm. Each algorithm keeps its own optimum, so this is computed
    /// once per estimator.
    pub fn optimum(&self, kind: AlgorithmKind) -> Result<OptimizationResult> {
        let algorithm = self.algorithm(kind).ok_or_else(|| {
            EstimatorError::not_applicable(kind, "excluded by the estimator configuration")
        })?;
        if algorithm.is_optimized() {
            debug!(algorithm = %kind, "memoized optimum");
        }
        algorithm.optimize()
    }

    /// Optimizes the applicable algorithms in `filter` (all when `None`), in declaration
    /// order, with their time under `measure`.
    fn evaluate(
        &self,
        filter: Option<&[AlgorithmKind]>,
        measure: TimeMeasure,
    ) -> Vec<(AlgorithmKind, Result<OptimizationResult>)> {
        let selected: Vec<&Algorithm> = self
            .applicable_algorithms()
            .filter(|a| filter.map_or(true, |kinds| kinds.contains(&a.kind())))
            .collect();
        info!(
            q = self.instance.q(),
            n = self.instance.nvariables(),
            m = self.instance.npolynomials(),
            algorithms = selected.len(),
            ?measure,
            "evaluating algorithms"
        );
        let evaluate_one = |algorithm: &&Algorithm| {
            let outcome = algorithm.optimize().and_then(|mut result| {
                if measure == TimeMeasure::TildeO {
                    result.time = algorithm.tilde_o_time_at(&result.parameters)?;
                }
                Ok(result)
            });
            (algorithm.kind(), outcome)
        };
        if self.config.parallel {
            selected.par_iter().map(evaluate_one).collect()
        } else {
            selected.iter().map(evaluate_one).collect()
        }
    }

    /// Ranked report of every applicable algorithm. Rows are sorted by time with declaration
    /// order breaking ties; algorithms whose evaluation failed are listed separately.
    pub fn table(&self, precision: usize) -> EstimatorReport {
        self.table_by(precision, TimeMeasure::Concrete)
    }

    /// [`Estimator::table`] ranked by the given time measure. Memory and parameters are those
    /// of the concrete optimum either way.
    pub fn table_by(&self, precision: usize, measure: TimeMeasure) -> EstimatorReport {
        let mut rows = Vec::new();
        let mut failures = Vec::new();
        for (kind, outcome) in self.evaluate(None, measure) {
            match outcome {
                Ok(result) => rows.push(ReportRow::new(kind, result, &self.instance)),
                Err(error) => failures.push(ReportFailure {
                    algorithm: kind,
                    error,
                }),
            }
        }
        rows.sort_by(|a, b| a.time.total_cmp(&b.time));
        EstimatorReport::new(precision, measure, rows, failures)
    }

    /// The applicable algorithm of least time, optionally restricted to `filter`.
    ///
    /// Only the selected algorithms are optimized. Those whose optimization fails are not
    /// ranked. When the selection holds no success at all, the first failure is returned, or
    /// [`EstimatorError::EmptySelection`] if nothing was evaluated.
    pub fn fastest_algorithm(&self, filter: Option<&[AlgorithmKind]>) -> Result<&Algorithm> {
        self.fastest_algorithm_by(filter, TimeMeasure::Concrete)
    }

    pub fn fastest_algorithm_by(
        &self,
        filter: Option<&[AlgorithmKind]>,
        measure: TimeMeasure,
    ) -> Result<&Algorithm> {
        let mut best: Option<(AlgorithmKind, f64)> = None;
        let mut first_failure = None;
        for (kind, outcome) in self.evaluate(filter, measure) {
            match outcome {
                Ok(result) => {
                    if best.map_or(true, |(_, time)| result.time < time) {
                        best = Some((kind, result.time));
                    }
                }
                Err(error) => {
                    first_failure.get_or_insert(error);
                }
            }
        }

        match best {
            Some((kind, _)) => self
                .algorithm(kind)
                .ok_or(EstimatorError::EmptySelection),
            None => Err(first_failure.unwrap_or(EstimatorError::EmptySelection)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        assert_eq!(estimator.state(), EstimatorState::Unevaluated);
        estimator.optimum(AlgorithmKind::ExhaustiveSearch).unwrap();
        assert_eq!(estimator.state(), EstimatorState::Evaluated);
    }

    #[test]
    fn test_optimum_is_memoized() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        let first = estimator.optimum(AlgorithmKind::HybridF5).unwrap();
        let second = estimator.optimum(AlgorithmKind::HybridF5).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.parameters.integer("k"), Some(4));
    }

    #[test]
    fn test_errors_are_stable() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        let first = estimator.optimum(AlgorithmKind::Bjorklund).unwrap_err();
        let second = estimator.optimum(AlgorithmKind::Bjorklund).unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, EstimatorError::NotApplicable { .. }));
    }

    #[test]
    fn test_excluded_algorithms_are_not_constructed() {
        let config = EstimatorConfig::default()
            .excluding(AlgorithmKind::Lokshtanov)
            .excluding(AlgorithmKind::Crossbred);
        let estimator =
            Estimator::with_config(ProblemInstance::new(31, 15, 10).unwrap(), config);
        assert_eq!(estimator.algorithms().len(), 10);
        assert!(estimator.algorithm(AlgorithmKind::Crossbred).is_none());
        assert!(matches!(
            estimator.optimum(AlgorithmKind::Crossbred),
            Err(EstimatorError::NotApplicable { .. })
        ));
        // HybridF5 takes over once Crossbred is gone
        let fastest = estimator.fastest_algorithm(None).unwrap();
        assert_eq!(fastest.kind(), AlgorithmKind::HybridF5);
    }

    #[test]
    fn test_applicable_algorithms_skip_field_restricted_ones() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        let kinds: Vec<AlgorithmKind> =
            estimator.applicable_algorithms().map(|a| a.kind()).collect();
        assert!(!kinds.contains(&AlgorithmKind::Bjorklund));
        assert!(!kinds.contains(&AlgorithmKind::Kpg));
        assert!(!kinds.contains(&AlgorithmKind::Mht));
        assert!(kinds.contains(&AlgorithmKind::Crossbred));
        assert_eq!(kinds.len(), 7);
    }

    #[test]
    fn test_filtered_selection() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        let filter = [AlgorithmKind::ExhaustiveSearch, AlgorithmKind::F5];
        let fastest = estimator.fastest_algorithm(Some(filter.as_slice())).unwrap();
        assert_eq!(fastest.kind(), AlgorithmKind::ExhaustiveSearch);

        assert_eq!(
            estimator
                .fastest_algorithm(Some(&[][..]))
                .map(|a| a.kind())
                .unwrap_err(),
            EstimatorError::EmptySelection
        );
        // inapplicable algorithms are never evaluated, so they cannot be selected
        assert_eq!(
            estimator
                .fastest_algorithm(Some(&[AlgorithmKind::Bjorklund][..]))
                .map(|a| a.kind())
                .unwrap_err(),
            EstimatorError::EmptySelection
        );
    }

    #[test]
    fn test_failures_surface_when_nothing_succeeds() {
        let instance = ProblemInstance::builder(31, 15, 10)
            .memory_bound(1.0)
            .build()
            .unwrap();
        let estimator = Estimator::new(instance);
        let err = estimator
            .fastest_algorithm(Some(&[AlgorithmKind::F5][..]))
            .map(|a| a.kind())
            .unwrap_err();
        assert!(matches!(err, EstimatorError::NoFeasibleParameters { .. }));
    }

    #[test]
    fn test_filter_is_applied_before_optimizing() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        let filter = [AlgorithmKind::ExhaustiveSearch];
        estimator.fastest_algorithm(Some(filter.as_slice())).unwrap();
        for algorithm in estimator.algorithms() {
            assert_eq!(
                algorithm.is_optimized(),
                algorithm.kind() == AlgorithmKind::ExhaustiveSearch,
                "{}",
                algorithm.kind()
            );
        }
    }

    #[test]
    fn test_tilde_o_ranking() {
        let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
        let report = estimator.table_by(4, TimeMeasure::TildeO);
        assert_eq!(report.measure, TimeMeasure::TildeO);
        let crossbred = report.row(AlgorithmKind::Crossbred).unwrap();
        assert!((crossbred.time - 30.6106).abs() < 1e-2);
        // memory stays that of the concrete optimum
        assert!((crossbred.memory - 21.6109).abs() < 1e-2);
        let cgmta = report.row(AlgorithmKind::Cgmta).unwrap();
        assert!((cgmta.time - 38.7316).abs() < 1e-2);
        assert!(report.rows.windows(2).all(|w| w[0].time <= w[1].time));

        let fastest = estimator
            .fastest_algorithm_by(None, TimeMeasure::TildeO)
            .unwrap();
        assert_eq!(fastest.kind(), report.fastest().unwrap().algorithm);
        assert_eq!(estimator.table(4).measure, TimeMeasure::Concrete);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let parallel = Estimator::from_parameters(2, 10, 12).unwrap();
        let sequential = Estimator::with_config(
            ProblemInstance::new(2, 10, 12).unwrap(),
            EstimatorConfig::default().sequential(),
        );
        assert_eq!(parallel.table(4), sequential.table(4));
    }
}
