//! Miura, Hashimoto and Takagi: underdetermined systems with `n ≥ m(m + 3)/2` are solved in
//! polynomial time, paying an extra `2^m` outside characteristic two.

use num_bigint::BigUint;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::log2;
use crate::error::Result;
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{ParameterPoint, ParameterSchema};

#[derive(Clone, Debug)]
pub struct Mht {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl Mht {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

impl ComplexityModel for Mht {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Mht
    }

    fn applicability(&self) -> std::result::Result<(), String> {
        let instance = &self.ctx.instance;
        let m = instance.npolynomials() as u128;
        if m * (m + 3) > 2 * instance.nvariables_effective() as u128 {
            return Err("requires n >= m(m + 3)/2".into());
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
        let mut time = (m as f64).log2() + instance.w() * (n as f64).log2();
        if !instance.is_characteristic_two() {
            time += m as f64;
        }
        Ok(Complexity {
            time,
            memory: log2(&(BigUint::from(m) * n * n)),
        })
    }

    fn tilde_o_time(&self, _point: &ParameterPoint) -> Result<f64> {
        // polynomial time
        Ok(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Algorithm;
    use crate::instance::ProblemInstance;

    #[test]
    fn test_reference_values() {
        let boolean = Algorithm::for_instance(
            AlgorithmKind::Mht,
            ProblemInstance::builder(2, 183, 12).w(2.8).build().unwrap(),
        );
        assert!((boolean.time_complexity().unwrap() - 24.6289).abs() < 1e-2);
        assert!((boolean.memory_complexity().unwrap() - 18.6164).abs() < 1e-2);

        let ternary = Algorithm::for_instance(
            AlgorithmKind::Mht,
            ProblemInstance::builder(3, 183, 12).w(2.8).build().unwrap(),
        );
        assert!((ternary.time_complexity().unwrap() - 36.6289).abs() < 1e-2);
        assert_eq!(ternary.tilde_o_time().unwrap(), 0.0);
    }

    #[test]
    fn test_applicability_threshold() {
        // 12 * 15 / 2 = 90
        let mht = |n| {
            Algorithm::for_instance(AlgorithmKind::Mht, ProblemInstance::new(2, n, 12).unwrap())
        };
        assert!(!mht(89).is_applicable());
        assert!(mht(90).is_applicable());
    }
}
