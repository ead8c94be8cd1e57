//! Hybrid approach of Bettale, Faugère and Perret: guess `k` variables, then run F5 on the
//! remaining system for every guess. With quantum search the `q^k` guesses cost `q^(k/2)`.

use super::f5::f5_complexity;
use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct HybridF5 {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl HybridF5 {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

impl ComplexityModel for HybridF5 {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::HybridF5
    }

    fn schema(&self) -> ParameterSchema {
        let n = self.ctx.instance.nvariables_reduced() as u64;
        ParameterSchema::empty().with(
            "k",
            Domain::Integer {
                min: 0,
                max: self.ctx.cap(n - 1),
            },
        )
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let k = point
            .integer("k")
            .ok_or_else(|| EstimatorError::out_of_domain(self.kind(), "missing k"))?
            as usize;
        let q = instance.q();
        let remaining = f5_complexity(
            &self.ctx.series,
            q,
            instance.nvariables_reduced() - k,
            &instance.degrees_reduced(),
            instance.w(),
        )?;
        let mut guessing = k as f64 * (q as f64).log2();
        if self.ctx.quantum_search {
            guessing /= 2.0;
        }
        Ok(Complexity {
            time: guessing + remaining.time,
            memory: remaining.memory,
        })
    }
}
