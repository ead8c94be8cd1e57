//! Björklund, Kaski and Williams: recursive probabilistic-polynomial algorithm over `F_2`,
//! parameterized by the fraction `λ` of variables handled at each recursion level.

use num_bigint::BigUint;
use num_rational::Rational64;
use num_traits::{One, Zero};

use super::{solution_bits, ModelContext};
use crate::algorithms::AlgorithmKind;
use crate::arith::{floor_scaled, log2, log2_add, pow, sum_of_binomials};
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};

/// Õ(2^(0.803225 n)).
const TILDE_O_EXPONENT: f64 = 0.803225;

#[derive(Clone, Debug)]
pub struct Bjorklund {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

/// Time of one call on `n` variables and `m` equations.
fn recursion_time(n: usize, m: usize, lambda: Rational64) -> BigUint {
    if n <= 1 {
        return BigUint::one();
    }
    let l = floor_scaled(lambda, n);
    let step = BigUint::from(n)
        + BigUint::from((l + 2) * m) * sum_of_binomials(n, 2)
        + BigUint::from(n - l) * pow(2, n - l);
    BigUint::from(48 * n + 1)
        * sum_of_binomials(n - l, l + 4)
        * (recursion_time(l, l + 2, lambda) + step)
}

/// log2 of the memory of one call on `n` variables and `m` equations.
fn recursion_memory(n: usize, m: usize, lambda: Rational64) -> f64 {
    if n <= 1 {
        return f64::NEG_INFINITY;
    }
    let l = floor_scaled(lambda, n);
    let table = (n - l) as f64 + ((48 * n + 1) as f64).log2().log2();
    let equations = log2(&(BigUint::from(m) * sum_of_binomials(n, 2)));
    log2_add(log2_add(recursion_memory(l, l + 2, lambda), table), equations)
}

impl Bjorklund {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

impl ComplexityModel for Bjorklund {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Bjorklund
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
        let top = m.min(n - 1) - 1;
        ParameterSchema::empty().with(
            "lambda",
            Domain::Fraction {
                denominator: n,
                min_numerator: 3,
                max_numerator: self.ctx.cap(top.max(0) as u64) as i64,
            },
        )
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let lambda = point
            .fraction("lambda")
            .ok_or_else(|| EstimatorError::out_of_domain(self.kind(), "missing lambda"))?;
        let n = instance.nvariables_reduced();
        let m = instance.npolynomials_reduced();
        let bits = solution_bits(instance.nsolutions()) as usize;

        let mut total = BigUint::zero();
        for i in 1..n {
            total += recursion_time(n - i, m + bits + 2, lambda);
        }
        let time = ((8 * bits) as f64).log2() + (n as f64).log2().log2() + log2(&total);
        let memory = recursion_memory(n, m, lambda);

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        Ok(TILDE_O_EXPONENT * self.ctx.instance.nvariables_reduced() as f64)
    }
}
