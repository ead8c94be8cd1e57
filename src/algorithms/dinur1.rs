//! Dinur's first polynomial-method algorithm over `F_2` (EUROCRYPT 2021), parameterized by
//! `κ`, the fraction of variables eliminated at the top level, and `λ < κ`, the fraction
//! handled by each recursive call.

use num_bigint::BigUint;
use num_rational::Rational64;
use num_traits::Zero;

use super::{solution_bits, ModelContext};
use crate::algorithms::AlgorithmKind;
use crate::arith::{floor_scaled, log2, pow, sum_of_binomials};
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct Dinur1 {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl Dinur1 {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }

    fn fractions(&self, point: &ParameterPoint) -> Result<(Rational64, Rational64)> {
        let kind = self.kind();
        let kappa = point
            .fraction("kappa")
            .ok_or_else(|| EstimatorError::out_of_domain(kind, "missing kappa"))?;
        let lambda = point
            .fraction("lambda")
            .ok_or_else(|| EstimatorError::out_of_domain(kind, "missing lambda"))?;
        Ok((kappa, lambda))
    }

    /// Time of one call on `n` variables, `n1` of them eliminated, with degree bound `w`.
    fn recursion_time(&self, n: usize, n1: usize, w: usize, lambda: Rational64) -> BigUint {
        let n2 = (Rational64::from_integer(n1 as i64) - lambda * Rational64::from_integer(n as i64))
            .floor()
            .to_integer();
        if n2 <= 0 {
            return BigUint::from(n) * sum_of_binomials(n - n1, w) * pow(2, n1);
        }
        let n2 = n2 as usize;
        let instance = &self.ctx.instance;
        let equations =
            instance.npolynomials_reduced() + solution_bits(instance.nsolutions()) as usize + 2;

        let inner = self.recursion_time(n, n2, n2 + 4, lambda)
            + BigUint::from(n) * sum_of_binomials(n - n1, w) * pow(2, n1 - n2)
            + BigUint::from(n) * sum_of_binomials(n - n2, n2 + 4)
            + BigUint::from((n2 + 2) * equations) * sum_of_binomials(n, 2);
        BigUint::from(48 * n + 1) * inner
    }
}

impl ComplexityModel for Dinur1 {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Dinur1
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        if self.ctx.instance.q() != 2 {
            return Err("requires q = 2".into());
        }
        Ok(())
    }

    fn schema(&self) -> ParameterSchema {
        let instance = &self.ctx.instance;
        let n = instance.nvariables_reduced() as i64;
        let m = instance.npolynomials_reduced() as i64;
        let bits = solution_bits(instance.nsolutions()) as i64;
        let top = (m + bits).min((n - 1) / 3) - 1;
        let top = self.ctx.cap(top.max(0) as u64) as i64;
        ParameterSchema::empty()
            .with(
                "kappa",
                Domain::Fraction {
                    denominator: n - 1,
                    min_numerator: 1,
                    max_numerator: top,
                },
            )
            .with(
                "lambda",
                Domain::Fraction {
                    denominator: n - 1,
                    min_numerator: 1,
                    max_numerator: top - 1,
                },
            )
    }

    fn admissible(&self, point: &ParameterPoint) -> bool {
        self.fractions(point)
            .map_or(false, |(kappa, lambda)| lambda < kappa)
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let (kappa, lambda) = self.fractions(point)?;
        let n = instance.nvariables_reduced();
        let bits = solution_bits(instance.nsolutions());
        let complement = Rational64::from_integer(1) - kappa;

        let mut total = BigUint::zero();
        for i in 1..n {
            let size = n - i;
            total += self.recursion_time(
                size,
                floor_scaled(kappa, size),
                floor_scaled(complement, size),
                lambda,
            );
        }
        let time = ((8 * bits) as f64).log2() + (n as f64).log2().log2() + log2(&total);
        let memory = ((48 * n + 1) as f64).log2() + floor_scaled(complement, n) as f64;

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        // Õ(2^(0.6943 n))
        Ok(0.6943 * self.ctx.instance.nvariables_reduced() as f64)
    }
}
