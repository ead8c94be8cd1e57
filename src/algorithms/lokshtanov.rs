//! Polynomial-method algorithm of Lokshtanov, Paturi, Tamaki, Williams and Yu, parameterized
//! by the fraction `δ` of variables kept symbolic in the probabilistic polynomial.

use num_rational::Rational64;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::{floor_scaled, log2, log2_add};
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};
use crate::series::MonomialCounter;

#[derive(Clone, Debug)]
pub struct Lokshtanov {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl Lokshtanov {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }

    fn delta(&self, point: &ParameterPoint) -> Result<Rational64> {
        point
            .fraction("delta")
            .ok_or_else(|| EstimatorError::out_of_domain(self.kind(), "missing delta"))
    }

    /// Degree of the probabilistic polynomial when `kept` variables stay symbolic.
    fn degree(&self, kept: usize) -> usize {
        2 * (self.ctx.instance.q() as usize - 1) * (kept + 2)
    }

    /// Base-2 logarithm of the cost of one recursion level on `n` variables.
    ///
    /// The interpolation factor `n^(6q)` is far too large to materialize for big fields, so
    /// the whole level is priced in the exponent domain.
    fn level_cost(&self, n: usize, delta: Rational64) -> f64 {
        let q = self.ctx.instance.q();
        let log_q = (q as f64).log2();
        let log_n = (n as f64).log2();
        let kept = floor_scaled(delta, n);
        let monomials = MonomialCounter::new(n - kept, q).up_to_degree(self.degree(kept));
        let interpolation = log2(&monomials) + kept as f64 * log_q + 6.0 * q as f64 * log_n;
        log_n + log2_add((n - kept) as f64 * log_q, interpolation)
    }
}

impl ComplexityModel for Lokshtanov {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Lokshtanov
    }

    fn schema(&self) -> ParameterSchema {
        let instance = &self.ctx.instance;
        let n = instance.nvariables_reduced() as i64;
        let m = instance.npolynomials_reduced() as i64;
        let top = (m - 2).min(n) - 1;
        ParameterSchema::empty().with(
            "delta",
            Domain::Fraction {
                denominator: n,
                min_numerator: 1,
                max_numerator: self.ctx.cap(top.max(0) as u64) as i64,
            },
        )
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let delta = self.delta(point)?;
        let q = instance.q();
        let n = instance.nvariables_reduced();
        let log_q = (q as f64).log2();

        let total = (1..n)
            .map(|i| self.level_cost(n - i, delta))
            .fold(f64::NEG_INFINITY, log2_add);
        let time = (100.0 * log_q * (q - 1) as f64).log2() + total;

        let kept = floor_scaled(delta, n);
        let monomials = MonomialCounter::new(n - kept, q).up_to_degree(self.degree(kept));
        let memory = log2_add(
            log2(&monomials),
            (n as f64).log2().log2() + (n - kept) as f64 * log_q,
        );

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        let instance = &self.ctx.instance;
        let q = instance.q();
        let n = instance.nvariables_reduced() as f64;
        let log_q = (q as f64).log2();
        let time = if q == 2 {
            0.8765 * n
        } else if q.is_power_of_two() {
            0.9 * n * log_q
        } else if (instance.field().characteristic as f64).log2() < 8.0 * std::f64::consts::E {
            0.9975 * n * log_q
        } else {
            let degree = f64::from(instance.field().degree);
            n * log_q + (log_q / (2.0 * std::f64::consts::E * degree)).log2()
        };
        Ok(time)
    }
}
