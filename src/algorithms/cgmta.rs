//! Courtois, Goubin, Meier and Tacier: for underdetermined systems, linearize `k` equations
//! at a time by fixing a well-chosen subspace and search the rest.
//!
//! `k = min(m/2, sqrt(n/2 - sqrt(n/2)))` is a real number, so the cost `2·q^(m-k)` is taken in
//! the exponent domain rather than over exact integers.

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::error::Result;
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct Cgmta {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl Cgmta {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }

    /// Number of equations linearized per step, zero when the variables are too few.
    pub fn k(&self) -> f64 {
        let instance = &self.ctx.instance;
        let half = instance.nvariables_effective() as f64 / 2.0;
        let slack = half - half.sqrt();
        let bound = if slack > 0.0 { slack.sqrt() } else { 0.0 };
        (instance.npolynomials() as f64 / 2.0).min(bound)
    }

    /// `log2(q^(m - k))`.
    fn search_exponent(&self) -> f64 {
        let instance = &self.ctx.instance;
        (instance.npolynomials() as f64 - self.k()) * (instance.q() as f64).log2()
    }
}

impl ComplexityModel for Cgmta {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Cgmta
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        let instance = &self.ctx.instance;
        if instance.npolynomials() > instance.nvariables_effective() {
            return Err("requires no more equations than variables".into());
        }
        if self.k() <= 0.0 {
            return Err("too few variables to linearize any equation".into());
        }
        Ok(())
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::empty()
    }

    fn evaluate(&self, _point: &ParameterPoint) -> Result<Complexity> {
        let k = self.k();
        let log_q = (self.ctx.instance.q() as f64).log2();
        Ok(Complexity {
            time: 1.0 + self.search_exponent(),
            memory: (2.0 * k).log2() + k * log_q,
        })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        Ok(self.search_exponent())
    }
}
