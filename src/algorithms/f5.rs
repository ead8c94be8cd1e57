//! F5 Gröbner basis computation on the reduced system, costed through the degree of
//! regularity of a semi-regular sequence (Bardet, Faugère, Salvy).

use std::cmp::max;

use num_bigint::BigUint;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::{binomial, log2};
use crate::error::Result;
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{ParameterPoint, ParameterSchema};
use crate::series::SeriesEngine;

#[derive(Clone, Debug)]
pub struct F5 {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
}

impl F5 {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self { ctx, optimizer }
    }
}

/// Complexity of F5 on generic equations of the given `degrees` in `n` variables over `F_q`.
pub(crate) fn f5_complexity(
    series: &SeriesEngine,
    q: u64,
    n: usize,
    degrees: &[u64],
    w: f64,
) -> Result<Complexity> {
    let m = degrees.len();
    let dreg = series.degree_of_regularity_for_degrees(n, degrees, q)?;
    let macaulay = binomial(n + dreg - 1, dreg);

    let time = if m > n {
        w * log2(&binomial(n + dreg, dreg))
    } else {
        w * (log2(&BigUint::from(m)) + log2(&macaulay))
    };
    let memory = log2(&max(&macaulay * &macaulay, BigUint::from(m) * n * n));

    Ok(Complexity { time, memory })
}

impl ComplexityModel for F5 {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::F5
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::empty()
    }

    fn evaluate(&self, _point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        f5_complexity(
            &self.ctx.series,
            instance.q(),
            instance.nvariables_reduced(),
            &instance.degrees_reduced(),
            instance.w(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Algorithm;
    use crate::error::EstimatorError;
    use crate::instance::ProblemInstance;

    #[test]
    fn test_reference_values() {
        let algorithm = Algorithm::for_instance(
            AlgorithmKind::F5,
            ProblemInstance::new(31, 15, 10).unwrap(),
        );
        assert!((algorithm.time_complexity().unwrap() - 58.1099).abs() < 1e-2);
        assert!((algorithm.memory_complexity().unwrap() - 34.7155).abs() < 1e-2);

        let boolean = Algorithm::for_instance(
            AlgorithmKind::F5,
            ProblemInstance::new(2, 15, 15).unwrap(),
        );
        assert!((boolean.time_complexity().unwrap() - 43.5162).abs() < 1e-2);
        assert!((boolean.memory_complexity().unwrap() - 23.1586).abs() < 1e-2);

        let overdetermined = Algorithm::for_instance(
            AlgorithmKind::F5,
            ProblemInstance::new(31, 10, 15).unwrap(),
        );
        assert!((overdetermined.time_complexity().unwrap() - 28.0079).abs() < 1e-2);
        assert!((overdetermined.memory_complexity().unwrap() - 18.9636).abs() < 1e-2);
    }

    #[test]
    fn test_degree_cap_is_reported() {
        let series = SeriesEngine::new(4);
        let err = f5_complexity(&series, 31, 15, &[2; 15], 2.81).unwrap_err();
        assert!(matches!(err, EstimatorError::NoRegularityFound { .. }));
    }

    #[test]
    fn test_higher_degree_systems() {
        let overdetermined = Algorithm::for_instance(
            AlgorithmKind::F5,
            ProblemInstance::builder(256, 10, 15)
                .degrees(vec![3; 15])
                .w(2.0)
                .build()
                .unwrap(),
        );
        assert!((overdetermined.time_complexity().unwrap() - 32.9905).abs() < 1e-2);
        assert!((overdetermined.memory_complexity().unwrap() - 31.1385).abs() < 1e-2);

        let square = Algorithm::for_instance(
            AlgorithmKind::F5,
            ProblemInstance::builder(256, 5, 5)
                .degrees(vec![3; 5])
                .w(2.0)
                .build()
                .unwrap(),
        );
        assert!((square.time_complexity().unwrap() - 25.4732).abs() < 1e-2);
        assert!((square.memory_complexity().unwrap() - 20.8294).abs() < 1e-2);

        let mixed = Algorithm::for_instance(
            AlgorithmKind::F5,
            ProblemInstance::builder(7, 8, 9)
                .degrees(vec![2, 2, 3, 3, 4, 4, 2, 3, 3])
                .build()
                .unwrap(),
        );
        assert!((mixed.time_complexity().unwrap() - 40.9396).abs() < 1e-2);
        assert!((mixed.memory_complexity().unwrap() - 26.9636).abs() < 1e-2);
    }
}
