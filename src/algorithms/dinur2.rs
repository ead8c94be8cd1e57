//! Dinur's second algorithm over `F_2` (ASIACRYPT 2021), which trades the recursion of the
//! first one for a single level of `n1` eliminated variables.

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::{log2, log2_add, log2_ratio, pow, sum_of_binomials};
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct Dinur2 {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl Dinur2 {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

/// `2^exponent` as an exact rational, for exponents of either sign.
fn power_of_two(exponent: i64) -> BigRational {
    let magnitude = BigInt::from(pow(2, exponent.unsigned_abs() as usize));
    if exponent >= 0 {
        BigRational::from_integer(magnitude)
    } else {
        BigRational::new(BigInt::from(1), magnitude)
    }
}

impl ComplexityModel for Dinur2 {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Dinur2
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        if self.ctx.instance.q() != 2 {
            return Err("requires q = 2".into());
        }
        Ok(())
    }

    fn schema(&self) -> ParameterSchema {
        let instance = &self.ctx.instance;
        let n = instance.nvariables_reduced() as u64;
        let m = instance.npolynomials_reduced() as u64;
        let top = (m.saturating_sub(2) / 2)
            .saturating_sub(1)
            .min(n - 1);
        ParameterSchema::empty().with(
            "n1",
            Domain::Integer {
                min: 1,
                max: self.ctx.cap(top),
            },
        )
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let n1 = point
            .integer("n1")
            .ok_or_else(|| EstimatorError::out_of_domain(self.kind(), "missing n1"))?
            as usize;
        let n = instance.nvariables_reduced();
        let interpolation = sum_of_binomials(n - n1, n1 + 3);

        // 16 log2(n) 2^n1 SB(n - n1, n1 + 3) + n1 n 2^(n - n1) + 2^(n - 2 n1 + 1) SB(n, 2)
        let evaluation = 4.0 + (n as f64).log2().log2() + n1 as f64 + log2(&interpolation);
        let enumeration = BigRational::from_integer(BigInt::from(
            BigUint::from(n1 * n) * pow(2, n - n1),
        )) + power_of_two(n as i64 - 2 * n1 as i64 + 1)
            * BigRational::from_integer(BigInt::from(sum_of_binomials(n, 2)));
        let time = log2_add(evaluation, log2_ratio(&enumeration));
        let memory = log2(&(BigUint::from(8 * (n1 + 1)) * interpolation));

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        // Õ(2^((1 - 1/(2·2.7)) n))
        Ok((1.0 - 1.0 / 5.4) * self.ctx.instance.nvariables_reduced() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Algorithm;
    use crate::instance::ProblemInstance;

    fn dinur(n: usize, m: usize) -> Algorithm {
        Algorithm::for_instance(AlgorithmKind::Dinur2, ProblemInstance::new(2, n, m).unwrap())
    }

    #[test]
    fn test_reference_values() {
        let algorithm = dinur(10, 12);
        assert!((algorithm.time_complexity().unwrap() - 15.8096).abs() < 1e-2);
        assert!((algorithm.memory_complexity().unwrap() - 11.3219).abs() < 1e-2);
        assert_eq!(algorithm.optimal_parameters().unwrap().integer("n1"), Some(4));

        let square = dinur(15, 15);
        assert!((square.time_complexity().unwrap() - 20.35).abs() < 1e-2);
        assert!((square.memory_complexity().unwrap() - 15.80).abs() < 1e-2);
        assert_eq!(square.optimal_parameters().unwrap().integer("n1"), Some(2));
    }

    #[test]
    fn test_tilde_o_time() {
        assert!((dinur(10, 12).tilde_o_time().unwrap() - 283.685_f64.log2()).abs() < 1e-3);
    }

    #[test]
    fn test_power_of_two() {
        assert_eq!(power_of_two(3), BigRational::from_integer(BigInt::from(8)));
        assert_eq!(power_of_two(-2), BigRational::new(BigInt::from(1), BigInt::from(4)));
    }

    #[test]
    fn test_needs_six_equations() {
        let algorithm = dinur(10, 5);
        assert!(matches!(
            algorithm.time_complexity(),
            Err(EstimatorError::NoFeasibleParameters { .. })
        ));
    }
}
