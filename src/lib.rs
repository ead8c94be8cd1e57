pub mod algorithms;
pub mod arith;
pub mod config;
pub mod error;
pub mod estimator;
pub mod instance;
pub mod optimizer;
pub mod params;
pub mod report;
pub mod security;
pub mod series;
pub mod units;


pub use algorithms::{Algorithm, AlgorithmKind, TimeMeasure};
pub use config::EstimatorConfig;
pub use error::{EstimatorError, Result};
pub use estimator::{Estimator, EstimatorState};
pub use instance::{FieldOrder, ProblemInstance, ProblemInstanceBuilder};
pub use optimizer::{Complexity, ComplexityModel, OptimizationResult, Optimizer};
pub use params::{Domain, ParameterPoint, ParameterSchema, ParameterValue};
pub use report::{EstimatorReport, ReportFailure, ReportRow};
pub use security::{min_npolynomials, min_nvariables, SECURITY_LEVELS};
pub use series::SeriesEngine;
pub use units::{nbits, ngates};

/// Estimate every applicable algorithm against `m` quadratic equations in `n` variables over
/// `F_q` with default constants, reported to four decimal digits.
pub fn estimate(q: u64, nvariables: usize, npolynomials: usize) -> Result<EstimatorReport> {
    let estimator = Estimator::from_parameters(q, nvariables, npolynomials)?;
    Ok(estimator.table(4))
}

/// The fastest applicable algorithm and its optimum for the given instance.
pub fn fastest(instance: ProblemInstance) -> Result<(AlgorithmKind, OptimizationResult)> {
    let estimator = Estimator::new(instance);
    let kind = estimator.fastest_algorithm(None)?.kind();
    Ok((kind, estimator.optimum(kind)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        let report = estimate(31, 15, 10).unwrap();
        let fastest = report.fastest().unwrap();
        assert_eq!(fastest.algorithm, AlgorithmKind::Crossbred);
        assert!((fastest.time - 27.98).abs() < 1e-2);
        assert!(matches!(
            estimate(1, 15, 10),
            Err(EstimatorError::InvalidInstance(_))
        ));
    }

    #[test]
    fn test_fastest() {
        let (kind, result) = fastest(ProblemInstance::new(2, 10, 12).unwrap()).unwrap();
        assert_eq!(kind, AlgorithmKind::Crossbred);
        assert!((result.time - 12.685).abs() < 1e-2);
        assert_eq!(result.parameters.to_string(), "D: 3, k: 7, d: 1");
    }
}
