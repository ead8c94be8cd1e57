//! Kipnis, Patarin and Goubin: heavily underdetermined systems over fields of characteristic
//! two are solved in polynomial time.

use num_bigint::BigUint;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::log2;
use crate::error::Result;
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct Kpg {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl Kpg {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

impl ComplexityModel for Kpg {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Kpg
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        let instance = &self.ctx.instance;
        if !instance.is_characteristic_two() {
            return Err("requires a field of characteristic two".into());
        }
        let m = instance.npolynomials() as u128;
        if m * (m + 1) >= instance.nvariables_effective() as u128 {
            return Err("requires n > m(m + 1)".into());
        }
        Ok(())
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::empty()
    }

    fn evaluate(&self, _point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let n = instance.nvariables_effective();
        let m = instance.npolynomials();
        Ok(Complexity {
            time: (m as f64).log2() + instance.w() * (n as f64).log2(),
            memory: log2(&(BigUint::from(m) * n * n)),
        })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        // polynomial time
        Ok(0.0)
    }
}
