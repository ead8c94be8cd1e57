//! Exhaustive search: enumerate every assignment of the reduced system (fast enumeration of
//! Bouillaguet et al. over `F_2`, plain enumeration otherwise).

use num_bigint::BigUint;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::{log2, log2_log};
use crate::error::Result;
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct ExhaustiveSearch {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl ExhaustiveSearch {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

impl ComplexityModel for ExhaustiveSearch {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::ExhaustiveSearch
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::empty()
    }

    fn evaluate(&self, _point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let q = instance.q();
        let n = instance.nvariables_reduced();
        let solutions = log2(&(BigUint::from(instance.nsolutions()) + 1u32));

        // q = 2: 4 log2(n) 2^n / (s + 1), otherwise log_q(n) q^n / (s + 1)
        let time = if q == 2 {
            2.0 + log2_log(n, 2.0) + n as f64 - solutions
        } else {
            log2_log(n, q as f64) + n as f64 * (q as f64).log2() - solutions
        };
        let memory = log2(&(BigUint::from(instance.npolynomials()) * n * n));

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        let instance = &self.ctx.instance;
        Ok(instance.nvariables_reduced() as f64 * (instance.q() as f64).log2())
    }
}
