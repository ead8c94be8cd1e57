//! Parameter optimization engine.
//!
//! Every algorithm with free parameters exposes them as a [`ParameterSchema`]; the engine
//! sweeps the full grid in lexicographic order, keeping the first point of minimal time, so ties
//! always resolve to the lexicographically smallest assignment. The outermost parameter is split
//! across the rayon pool; each slice is swept sequentially and the slice winners are merged in
//! slice order, which keeps the result independent of scheduling.
//!
//! Pruning is driven by [`ComplexityModel::time_lower_bound`]: a branch is cut only when a proven
//! lower bound for every completion already exceeds the best time of the slice.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use crate::algorithms::AlgorithmKind;
use crate::error::{EstimatorError, Result};
use crate::params::{ParameterPoint, ParameterSchema, ParameterSpec, ParameterValue};

/// Slack applied before a lower bound may cut a branch.
const PRUNING_MARGIN: f64 = 1e-9;

/// log2 of time and memory at one parameter point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Complexity {
    pub time: f64,
    pub memory: f64,
}

/// The minimizing assignment found for one algorithm and the complexity at that point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub parameters: ParameterPoint,
    pub time: f64,
    pub memory: f64,
}

/// Complexity formulas of one algorithm bound to one problem instance.
pub trait ComplexityModel: Sync {
    fn kind(&self) -> AlgorithmKind;

    /// `Err(reason)` when the algorithm does not apply to the instance.
    fn applicability(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    fn schema(&self) -> ParameterSchema;

    /// Joint feasibility of a complete point whose values already lie in their domains.
    fn admissible(&self, _point: &ParameterPoint) -> bool {
        true
    }

    /// Complexity at an admissible point.
    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity>;

    /// log2 of the asymptotic time with polynomial factors dropped, at an admissible point.
    /// Models whose formula has no such factors report their concrete time.
    fn tilde_o_time(&self, point: &ParameterPoint) -> Result<f64> {
        Ok(self.evaluate(point)?.time)
    }

    /// A lower bound on the time of every completion of `prefix`, if one is known.
    fn time_lower_bound(&self, _prefix: &ParameterPoint) -> Option<f64> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optimizer {
    memory_bound: Option<f64>,
    max_evaluations: Option<usize>,
    parallel: bool,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            memory_bound: None,
            max_evaluations: None,
            parallel: true,
        }
    }
}

#[derive(Default)]
struct SliceOutcome {
    best: Option<OptimizationResult>,
    admissible: usize,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_bound(mut self, bound: Option<f64>) -> Self {
        self.memory_bound = bound;
        self
    }

    pub fn with_max_evaluations(mut self, cap: Option<usize>) -> Self {
        self.max_evaluations = cap;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn memory_bound(&self) -> Option<f64> {
        self.memory_bound
    }

    /// Finds the admissible point of minimal time within the memory bound.
    pub fn minimize<M: ComplexityModel + ?Sized>(&self, model: &M) -> Result<OptimizationResult> {
        let kind = model.kind();
        let schema = model.schema();

        if schema.is_empty() {
            let point = ParameterPoint::new();
            let complexity = model.evaluate(&point)?;
            if !self.within_memory_bound(&complexity) {
                return Err(EstimatorError::infeasible(
                    kind,
                    format!(
                        "memory 2^{:.3} exceeds the bound 2^{:.3}",
                        complexity.memory,
                        self.memory_bound.unwrap_or(f64::INFINITY)
                    ),
                ));
            }
            return Ok(OptimizationResult {
                parameters: point,
                time: complexity.time,
                memory: complexity.memory,
            });
        }

        let grid = schema.grid_size();
        if let Some(cap) = self.max_evaluations {
            if grid > cap {
                return Err(EstimatorError::infeasible(
                    kind,
                    format!("search grid of {} points exceeds the cap of {}", grid, cap),
                ));
            }
        }

        let specs = schema.specs();
        let outer = &specs[0];
        let sweep_slice = |value: ParameterValue| -> Result<SliceOutcome> {
            let mut prefix = ParameterPoint::new();
            prefix.push(outer.name, value);
            let mut outcome = SliceOutcome::default();
            self.sweep(model, specs, &mut prefix, &mut outcome)?;
            Ok(outcome)
        };
        let slices: Vec<Result<SliceOutcome>> = if self.parallel {
            outer.domain.values().into_par_iter().map(sweep_slice).collect()
        } else {
            outer.domain.values().into_iter().map(sweep_slice).collect()
        };

        let mut best: Option<OptimizationResult> = None;
        let mut admissible = 0;
        for slice in slices {
            let slice = slice?;
            admissible += slice.admissible;
            if let Some(candidate) = slice.best {
                if best.as_ref().map_or(true, |b| candidate.time < b.time) {
                    best = Some(candidate);
                }
            }
        }

        match best {
            Some(result) => {
                debug!(
                    algorithm = %kind,
                    parameters = %result.parameters,
                    time = result.time,
                    memory = result.memory,
                    "optimum found"
                );
                Ok(result)
            }
            None if admissible == 0 => Err(EstimatorError::infeasible(
                kind,
                "no admissible parameter point",
            )),
            None => Err(EstimatorError::infeasible(
                kind,
                format!(
                    "all {} admissible points exceed the memory bound 2^{:.3}",
                    admissible,
                    self.memory_bound.unwrap_or(f64::INFINITY)
                ),
            )),
        }
    }

    fn sweep<M: ComplexityModel + ?Sized>(
        &self,
        model: &M,
        specs: &[ParameterSpec],
        prefix: &mut ParameterPoint,
        outcome: &mut SliceOutcome,
    ) -> Result<()> {
        let depth = prefix.len();
        if depth == specs.len() {
            return self.visit(model, prefix, outcome);
        }
        if let (Some(best), Some(bound)) = (&outcome.best, model.time_lower_bound(prefix)) {
            if bound > best.time + PRUNING_MARGIN {
                trace!(algorithm = %model.kind(), prefix = %prefix, bound, "pruned");
                return Ok(());
            }
        }
        let spec = &specs[depth];
        for value in spec.domain.values() {
            prefix.push(spec.name, value);
            let visited = self.sweep(model, specs, prefix, outcome);
            prefix.pop();
            visited?;
        }
        Ok(())
    }

    fn visit<M: ComplexityModel + ?Sized>(
        &self,
        model: &M,
        point: &ParameterPoint,
        outcome: &mut SliceOutcome,
    ) -> Result<()> {
        if !model.admissible(point) {
            return Ok(());
        }
        outcome.admissible += 1;
        let complexity = model.evaluate(point)?;
        if !self.within_memory_bound(&complexity) {
            return Ok(());
        }
        if outcome
            .best
            .as_ref()
            .map_or(true, |b| complexity.time < b.time)
        {
            outcome.best = Some(OptimizationResult {
                parameters: point.clone(),
                time: complexity.time,
                memory: complexity.memory,
            });
        }
        Ok(())
    }

    fn within_memory_bound(&self, complexity: &Complexity) -> bool {
        self.memory_bound
            .map_or(true, |bound| complexity.memory <= bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Domain;

    /// `time = (x - 3)^2 + y`, `memory = x`, admissible when `x + y` is even.
    struct Bowl {
        with_bound: bool,
    }

    impl ComplexityModel for Bowl {
        fn kind(&self) -> AlgorithmKind {
            AlgorithmKind::HybridF5
        }

        fn schema(&self) -> ParameterSchema {
            ParameterSchema::empty()
                .with("x", Domain::Integer { min: 0, max: 6 })
                .with("y", Domain::Integer { min: 0, max: 4 })
        }

        fn admissible(&self, point: &ParameterPoint) -> bool {
            let (x, y) = (point.integer("x").unwrap(), point.integer("y").unwrap());
            (x + y) % 2 == 0
        }

        fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
            let x = point.integer("x").unwrap() as f64;
            let y = point.integer("y").unwrap() as f64;
            Ok(Complexity {
                time: (x - 3.0).powi(2) + y,
                memory: x,
            })
        }

        fn time_lower_bound(&self, prefix: &ParameterPoint) -> Option<f64> {
            if !self.with_bound {
                return None;
            }
            prefix
                .integer("x")
                .map(|x| (x as f64 - 3.0).powi(2))
        }
    }

    /// Constant time everywhere, so every point ties.
    struct Flat;

    impl ComplexityModel for Flat {
        fn kind(&self) -> AlgorithmKind {
            AlgorithmKind::Crossbred
        }

        fn schema(&self) -> ParameterSchema {
            ParameterSchema::empty()
                .with("a", Domain::Integer { min: 2, max: 5 })
                .with("b", Domain::Integer { min: 1, max: 3 })
        }

        fn evaluate(&self, _point: &ParameterPoint) -> Result<Complexity> {
            Ok(Complexity {
                time: 7.0,
                memory: 1.0,
            })
        }
    }

    #[test]
    fn test_finds_minimum() {
        let result = Optimizer::new().minimize(&Bowl { with_bound: false }).unwrap();
        // (2, 0), (3, 1) and (4, 0) all cost 1; the smallest wins
        assert_eq!(result.parameters.integer("x"), Some(2));
        assert_eq!(result.parameters.integer("y"), Some(0));
        assert_eq!(result.time, 1.0);
    }

    #[test]
    fn test_pruning_does_not_change_result() {
        let plain = Optimizer::new().minimize(&Bowl { with_bound: false }).unwrap();
        let pruned = Optimizer::new().minimize(&Bowl { with_bound: true }).unwrap();
        assert_eq!(plain, pruned);
    }

    #[test]
    fn test_ties_resolve_to_smallest_point() {
        for parallel in [true, false] {
            let result = Optimizer::new()
                .with_parallel(parallel)
                .minimize(&Flat)
                .unwrap();
            assert_eq!(result.parameters.integer("a"), Some(2));
            assert_eq!(result.parameters.integer("b"), Some(1));
        }
    }

    #[test]
    fn test_memory_bound_restricts_search() {
        let result = Optimizer::new()
            .with_memory_bound(Some(1.0))
            .minimize(&Bowl { with_bound: false })
            .unwrap();
        // x <= 1 with x + y even: (1, 1) costs 5
        assert_eq!(result.parameters.integer("x"), Some(1));
        assert_eq!(result.time, 5.0);

        let err = Optimizer::new()
            .with_memory_bound(Some(-1.0))
            .minimize(&Bowl { with_bound: false })
            .unwrap_err();
        assert!(matches!(err, EstimatorError::NoFeasibleParameters { .. }));
    }

    #[test]
    fn test_evaluation_cap() {
        let err = Optimizer::new()
            .with_max_evaluations(Some(10))
            .minimize(&Bowl { with_bound: false })
            .unwrap_err();
        assert!(matches!(err, EstimatorError::NoFeasibleParameters { .. }));
        assert!(Optimizer::new()
            .with_max_evaluations(Some(35))
            .minimize(&Bowl { with_bound: false })
            .is_ok());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let optimizer = Optimizer::new();
        let first = optimizer.minimize(&Bowl { with_bound: true }).unwrap();
        let second = optimizer.minimize(&Bowl { with_bound: true }).unwrap();
        assert_eq!(first, second);
    }
}
