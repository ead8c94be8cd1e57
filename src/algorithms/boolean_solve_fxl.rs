//! BooleanSolve (Bardet, Faugère, Salvy, Spaenlehauer) and FXL (Yang, Chen): guess `k`
//! variables and solve a Macaulay system at the witness degree, either with a sparse
//! Las Vegas solver or with deterministic dense linear algebra.

use std::cmp::max;

use num_bigint::BigUint;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::{binomial, log2, pow};
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};

const VARIANTS: &[&str] = &["las_vegas", "deterministic"];

#[derive(Clone, Debug)]
pub struct BooleanSolveFxl {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl BooleanSolveFxl {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }

    fn unpack(&self, point: &ParameterPoint) -> Result<(usize, &'static str)> {
        let kind = self.kind();
        let k = point
            .integer("k")
            .ok_or_else(|| EstimatorError::out_of_domain(kind, "missing k"))?;
        let variant = point
            .choice("variant")
            .ok_or_else(|| EstimatorError::out_of_domain(kind, "missing variant"))?;
        Ok((k as usize, variant))
    }

    /// Columns of the Macaulay matrix at the witness degree once `k` variables are guessed.
    fn macaulay(&self, k: usize) -> Result<BigUint> {
        let instance = &self.ctx.instance;
        let remaining = instance.nvariables_reduced() - k;
        let m = instance.npolynomials_reduced();
        let witness = self.ctx.series.witness_degree(remaining, m, instance.q())?;
        Ok(binomial(remaining + witness, witness))
    }
}

impl ComplexityModel for BooleanSolveFxl {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::BooleanSolveFxl
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        let instance = &self.ctx.instance;
        if instance.npolynomials_reduced() < instance.nvariables_reduced() {
            return Err("requires at least as many equations as variables".into());
        }
        Ok(())
    }

    fn schema(&self) -> ParameterSchema {
        let instance = &self.ctx.instance;
        let n = instance.nvariables_reduced() as u64;
        // a square system needs at least one guess to become overdetermined
        let min = if instance.npolynomials_reduced() > instance.nvariables_reduced() {
            0
        } else {
            1
        };
        ParameterSchema::empty()
            .with(
                "k",
                Domain::Integer {
                    min,
                    max: self.ctx.cap(n - 1),
                },
            )
            .with("variant", Domain::Choice(VARIANTS))
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let (k, variant) = self.unpack(point)?;
        let q = instance.q();
        let n = instance.nvariables_reduced();
        let m = instance.npolynomials_reduced();
        let macaulay = self.macaulay(k)?;

        let time = match variant {
            "las_vegas" => log2(
                &(BigUint::from(3u32)
                    * binomial(n - k + 2, 2)
                    * pow(q, k)
                    * &macaulay
                    * &macaulay),
            ),
            _ => {
                k as f64 * (q as f64).log2()
                    + (m as f64).log2()
                    + instance.w() * log2(&macaulay)
            }
        };
        let memory = log2(&max(&macaulay * &macaulay, BigUint::from(m) * n * n));

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, point: &ParameterPoint) -> Result<f64> {
        let instance = &self.ctx.instance;
        let (k, variant) = self.unpack(point)?;
        let exponent = match variant {
            "las_vegas" => 2.0,
            _ => instance.w(),
        };
        Ok(k as f64 * (instance.q() as f64).log2() + exponent * log2(&self.macaulay(k)?))
    }
}
