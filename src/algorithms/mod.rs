//! The closed set of attack strategies and the shared interface over them.
//!
//! Each strategy lives in its own module as a [`ComplexityModel`]. [`Algorithm`] is the tagged
//! union the rest of the crate works with: it checks applicability, routes explicit parameter
//! points through the schema, runs the optimizer for implicit ones and charges the cost of the
//! `h` variables guessed up front.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::config::EstimatorConfig;
use crate::error::{EstimatorError, Result};
use crate::instance::ProblemInstance;
use crate::optimizer::{Complexity, ComplexityModel, OptimizationResult, Optimizer};
use crate::params::{ParameterPoint, ParameterSchema};
use crate::series::SeriesEngine;

mod bjorklund;
mod boolean_solve_fxl;
mod cgmta;
mod crossbred;
mod dinur1;
mod dinur2;
mod exhaustive_search;
mod f5;
mod hybrid_f5;
mod kpg;
mod lokshtanov;
mod mht;

pub use bjorklund::Bjorklund;
pub use boolean_solve_fxl::BooleanSolveFxl;
pub use cgmta::Cgmta;
pub use crossbred::Crossbred;
pub use dinur1::Dinur1;
pub use dinur2::Dinur2;
pub use exhaustive_search::ExhaustiveSearch;
pub use f5::F5;
pub use hybrid_f5::HybridF5;
pub use kpg::Kpg;
pub use lokshtanov::Lokshtanov;
pub use mht::Mht;

/// Tag of every supported algorithm, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AlgorithmKind {
    ExhaustiveSearch,
    F5,
    HybridF5,
    BooleanSolveFxl,
    Crossbred,
    Cgmta,
    Lokshtanov,
    Bjorklund,
    Dinur1,
    Dinur2,
    Kpg,
    Mht,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 12] = [
        AlgorithmKind::ExhaustiveSearch,
        AlgorithmKind::F5,
        AlgorithmKind::HybridF5,
        AlgorithmKind::BooleanSolveFxl,
        AlgorithmKind::Crossbred,
        AlgorithmKind::Cgmta,
        AlgorithmKind::Lokshtanov,
        AlgorithmKind::Bjorklund,
        AlgorithmKind::Dinur1,
        AlgorithmKind::Dinur2,
        AlgorithmKind::Kpg,
        AlgorithmKind::Mht,
    ];

    /// Name under which the algorithm is published.
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::ExhaustiveSearch => "ExhaustiveSearch",
            AlgorithmKind::F5 => "F5",
            AlgorithmKind::HybridF5 => "HybridF5",
            AlgorithmKind::BooleanSolveFxl => "BooleanSolveFXL",
            AlgorithmKind::Crossbred => "Crossbred",
            AlgorithmKind::Cgmta => "CGMTA",
            AlgorithmKind::Lokshtanov => "Lokshtanov",
            AlgorithmKind::Bjorklund => "Bjorklund",
            AlgorithmKind::Dinur1 => "Dinur1",
            AlgorithmKind::Dinur2 => "Dinur2",
            AlgorithmKind::Kpg => "KPG",
            AlgorithmKind::Mht => "MHT",
        }
    }

    /// Whether the cost model covers equations of arbitrary degree rather than quadrics only.
    pub fn handles_any_degree(&self) -> bool {
        matches!(self, AlgorithmKind::F5 | AlgorithmKind::HybridF5)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which time estimate ranks and reports algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TimeMeasure {
    /// Operation counts of the published formulas.
    #[default]
    Concrete,
    /// Asymptotic Õ estimate, polynomial factors dropped.
    TildeO,
}

/// What every model needs from its surroundings.
#[derive(Clone, Debug)]
pub struct ModelContext {
    pub(crate) instance: Arc<ProblemInstance>,
    pub(crate) series: SeriesEngine,
    pub(crate) outer_bound: Option<u64>,
    pub(crate) quantum_search: bool,
    /// Optimum of the model, filled on first use.
    optimum: OnceLock<Result<OptimizationResult>>,
}

impl ModelContext {
    pub fn new(
        instance: Arc<ProblemInstance>,
        series: SeriesEngine,
        outer_bound: Option<u64>,
        quantum_search: bool,
    ) -> Self {
        Self {
            instance,
            series,
            outer_bound,
            quantum_search,
            optimum: OnceLock::new(),
        }
    }

    /// `natural` capped by the caller's outer-parameter override.
    pub(crate) fn cap(&self, natural: u64) -> u64 {
        self.outer_bound.map_or(natural, |bound| bound.min(natural))
    }
}

/// `⌊log2(s + 1)⌋` for an expected number of solutions `s`.
pub(crate) fn solution_bits(nsolutions: u64) -> u64 {
    nsolutions.saturating_add(1).ilog2() as u64
}

/// One attack strategy bound to one problem instance.
#[derive(Debug)]
pub enum Algorithm {
    ExhaustiveSearch(ExhaustiveSearch),
    F5(F5),
    HybridF5(HybridF5),
    BooleanSolveFxl(BooleanSolveFxl),
    Crossbred(Crossbred),
    Cgmta(Cgmta),
    Lokshtanov(Lokshtanov),
    Bjorklund(Bjorklund),
    Dinur1(Dinur1),
    Dinur2(Dinur2),
    Kpg(Kpg),
    Mht(Mht),
}

impl Algorithm {
    pub fn new(
        kind: AlgorithmKind,
        instance: Arc<ProblemInstance>,
        config: &EstimatorConfig,
    ) -> Self {
        let series = SeriesEngine::new(config.series_degree_for(&instance));
        let optimizer = Optimizer::new()
            .with_memory_bound(instance.memory_bound())
            .with_max_evaluations(config.max_evaluations)
            .with_parallel(config.parallel);
        let ctx = ModelContext::new(
            instance,
            series,
            config.outer_bound(kind),
            config.quantum_search,
        );
        match kind {
            AlgorithmKind::ExhaustiveSearch => {
                Algorithm::ExhaustiveSearch(ExhaustiveSearch::new(ctx, optimizer))
            }
            AlgorithmKind::F5 => Algorithm::F5(F5::new(ctx, optimizer)),
            AlgorithmKind::HybridF5 => Algorithm::HybridF5(HybridF5::new(ctx, optimizer)),
            AlgorithmKind::BooleanSolveFxl => {
                Algorithm::BooleanSolveFxl(BooleanSolveFxl::new(ctx, optimizer))
            }
            AlgorithmKind::Crossbred => Algorithm::Crossbred(Crossbred::new(ctx, optimizer)),
            AlgorithmKind::Cgmta => Algorithm::Cgmta(Cgmta::new(ctx, optimizer)),
            AlgorithmKind::Lokshtanov => Algorithm::Lokshtanov(Lokshtanov::new(ctx, optimizer)),
            AlgorithmKind::Bjorklund => Algorithm::Bjorklund(Bjorklund::new(ctx, optimizer)),
            AlgorithmKind::Dinur1 => Algorithm::Dinur1(Dinur1::new(ctx, optimizer)),
            AlgorithmKind::Dinur2 => Algorithm::Dinur2(Dinur2::new(ctx, optimizer)),
            AlgorithmKind::Kpg => Algorithm::Kpg(Kpg::new(ctx, optimizer)),
            AlgorithmKind::Mht => Algorithm::Mht(Mht::new(ctx, optimizer)),
        }
    }

    /// Standalone algorithm with the default configuration.
    pub fn for_instance(kind: AlgorithmKind, instance: ProblemInstance) -> Self {
        Self::new(kind, Arc::new(instance), &EstimatorConfig::default())
    }

    fn model(&self) -> (&dyn ComplexityModel, &ModelContext, &Optimizer) {
        match self {
            Algorithm::ExhaustiveSearch(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::F5(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::HybridF5(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::BooleanSolveFxl(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Crossbred(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Cgmta(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Lokshtanov(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Bjorklund(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Dinur1(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Dinur2(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Kpg(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
            Algorithm::Mht(a) => (a as &dyn ComplexityModel, &a.ctx, &a.optimizer),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        self.model().0.kind()
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn instance(&self) -> &ProblemInstance {
        &self.model().1.instance
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        let (model, ctx, _) = self.model();
        if !ctx.instance.is_quadratic() && !model.kind().handles_any_degree() {
            return Err("requires a quadratic system".into());
        }
        model.applicability()
    }

    pub fn is_applicable(&self) -> bool {
        self.applicability().is_ok()
    }

    pub fn has_optimal_parameter(&self) -> bool {
        !self.model().0.schema().is_empty()
    }

    pub fn parameter_schema(&self) -> ParameterSchema {
        self.model().0.schema()
    }

    fn ensure_applicable(&self) -> Result<()> {
        self.applicability()
            .map_err(|reason| EstimatorError::not_applicable(self.kind(), reason))
    }

    /// Minimizes time over the parameter schema and reports the memory at the optimum.
    ///
    /// The sweep runs once per algorithm; later calls hand out the stored outcome.
    pub fn optimize(&self) -> Result<OptimizationResult> {
        self.ensure_applicable()?;
        let (model, ctx, optimizer) = self.model();
        ctx.optimum
            .get_or_init(|| {
                let mut result = optimizer.minimize(model)?;
                result.time += ctx.instance.hybridization_cost();
                Ok(result)
            })
            .clone()
    }

    /// `point` in schema order, checked against every domain and the joint constraints.
    fn checked_point(&self, point: &ParameterPoint) -> Result<ParameterPoint> {
        self.ensure_applicable()?;
        let model = self.model().0;
        let kind = model.kind();
        let point = model
            .schema()
            .canonicalize(point)
            .map_err(|reason| EstimatorError::out_of_domain(kind, reason))?;
        if !model.admissible(&point) {
            return Err(EstimatorError::out_of_domain(
                kind,
                format!("{} violates the joint constraints", point),
            ));
        }
        Ok(point)
    }

    /// Whether the optimum has already been computed.
    pub fn is_optimized(&self) -> bool {
        self.model().1.optimum.get().is_some()
    }

    /// Time and memory at an explicit parameter point.
    pub fn complexity_at(&self, point: &ParameterPoint) -> Result<Complexity> {
        let point = self.checked_point(point)?;
        let (model, ctx, _) = self.model();
        let mut complexity = model.evaluate(&point)?;
        complexity.time += ctx.instance.hybridization_cost();
        Ok(complexity)
    }

    /// log2 of the Õ time at the parameters minimizing the concrete time.
    pub fn tilde_o_time(&self) -> Result<f64> {
        let parameters = self.optimize()?.parameters;
        self.tilde_o_time_at(&parameters)
    }

    pub fn tilde_o_time_at(&self, point: &ParameterPoint) -> Result<f64> {
        let point = self.checked_point(point)?;
        let (model, ctx, _) = self.model();
        Ok(model.tilde_o_time(&point)? + ctx.instance.hybridization_cost())
    }

    /// log2 of the time under `measure` at the optimal parameters.
    pub fn time_by(&self, measure: TimeMeasure) -> Result<f64> {
        match measure {
            TimeMeasure::Concrete => self.time_complexity(),
            TimeMeasure::TildeO => self.tilde_o_time(),
        }
    }

    /// log2 of the time at the optimal parameters (or the closed form).
    pub fn time_complexity(&self) -> Result<f64> {
        Ok(self.optimize()?.time)
    }

    /// log2 of the memory at the parameters minimizing time.
    pub fn memory_complexity(&self) -> Result<f64> {
        Ok(self.optimize()?.memory)
    }

    pub fn time_complexity_at(&self, point: &ParameterPoint) -> Result<f64> {
        Ok(self.complexity_at(point)?.time)
    }

    pub fn memory_complexity_at(&self, point: &ParameterPoint) -> Result<f64> {
        Ok(self.complexity_at(point)?.memory)
    }

    pub fn optimal_parameters(&self) -> Result<ParameterPoint> {
        if !self.has_optimal_parameter() {
            return Err(EstimatorError::not_applicable(
                self.kind(),
                "the algorithm has no free parameters",
            ));
        }
        Ok(self.optimize()?.parameters)
    }
}
