//! Ranked estimator output.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::algorithms::{AlgorithmKind, TimeMeasure};
use crate::error::EstimatorError;
use crate::instance::ProblemInstance;
use crate::optimizer::OptimizationResult;
use crate::params::ParameterPoint;
use crate::units::{bits_per_element, gates_per_operation};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub algorithm: AlgorithmKind,
    /// log2 of the field operations, under the report's time measure.
    pub time: f64,
    /// log2 of the field elements stored.
    pub memory: f64,
    /// `None` for closed-form algorithms.
    pub parameters: Option<ParameterPoint>,
    /// log2 of the gate count, when the instance carries `theta`.
    pub time_gates: Option<f64>,
    pub memory_bits: f64,
}

impl ReportRow {
    pub fn new(
        algorithm: AlgorithmKind,
        result: OptimizationResult,
        instance: &ProblemInstance,
    ) -> Self {
        let q = instance.q();
        let parameters = (!result.parameters.is_empty()).then_some(result.parameters);
        Self {
            algorithm,
            time: result.time,
            memory: result.memory,
            parameters,
            time_gates: instance
                .theta()
                .map(|theta| result.time + gates_per_operation(q, theta)),
            memory_bits: result.memory + bits_per_element(q),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportFailure {
    pub algorithm: AlgorithmKind,
    pub error: EstimatorError,
}

/// Rows in ascending time; `precision` only affects rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EstimatorReport {
    pub precision: usize,
    pub measure: TimeMeasure,
    pub rows: Vec<ReportRow>,
    pub failures: Vec<ReportFailure>,
}

impl EstimatorReport {
    pub(crate) fn new(
        precision: usize,
        measure: TimeMeasure,
        rows: Vec<ReportRow>,
        failures: Vec<ReportFailure>,
    ) -> Self {
        Self {
            precision,
            measure,
            rows,
            failures,
        }
    }

    pub fn fastest(&self) -> Option<&ReportRow> {
        self.rows.first()
    }

    pub fn row(&self, algorithm: AlgorithmKind) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.algorithm == algorithm)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `value` rounded to the report precision.
    pub fn rounded(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision.min(15) as i32);
        (value * scale).round() / scale
    }
}

impl Display for EstimatorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let p = self.precision;
        let time = match self.measure {
            TimeMeasure::Concrete => "time",
            TimeMeasure::TildeO => "time (Õ)",
        };
        writeln!(f, "{:<18} {:>12} {:>12}  parameters", "algorithm", time, "memory")?;
        for row in &self.rows {
            let parameters = row
                .parameters
                .as_ref()
                .map_or_else(|| "--".to_string(), ToString::to_string);
            writeln!(
                f,
                "{:<18} {:>12.p$} {:>12.p$}  {}",
                row.algorithm.name(),
                row.time,
                row.memory,
                parameters,
                p = p
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "{:<18} {}", failure.algorithm.name(), failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::Rational64;

    fn report() -> EstimatorReport {
        let instance = ProblemInstance::builder(16, 20, 20).theta(2.0).build().unwrap();
        let rows = vec![
            ReportRow::new(
                AlgorithmKind::Crossbred,
                OptimizationResult {
                    parameters: ParameterPoint::new()
                        .with("D", 6u64)
                        .with("k", 8u64)
                        .with("d", 3u64),
                    time: 27.98041,
                    memory: 21.61093,
                },
                &instance,
            ),
            ReportRow::new(
                AlgorithmKind::F5,
                OptimizationResult {
                    parameters: ParameterPoint::new(),
                    time: 58.1099,
                    memory: 34.7155,
                },
                &instance,
            ),
        ];
        let failures = vec![ReportFailure {
            algorithm: AlgorithmKind::Lokshtanov,
            error: EstimatorError::NoFeasibleParameters {
                algorithm: AlgorithmKind::Lokshtanov,
                reason: "no admissible parameter point".into(),
            },
        }];
        EstimatorReport::new(2, TimeMeasure::Concrete, rows, failures)
    }

    #[test]
    fn test_row_units() {
        let report = report();
        let row = report.row(AlgorithmKind::Crossbred).unwrap();
        assert!((row.time_gates.unwrap() - (27.98041 + 36f64.log2())).abs() < 1e-12);
        assert!((row.memory_bits - 23.61093).abs() < 1e-12);
        assert!(report.row(AlgorithmKind::F5).unwrap().parameters.is_none());

        let plain = ProblemInstance::new(16, 20, 20).unwrap();
        let result = OptimizationResult {
            parameters: ParameterPoint::new().with("delta", Rational64::new(1, 10)),
            time: 1.0,
            memory: 1.0,
        };
        assert_eq!(
            ReportRow::new(AlgorithmKind::Lokshtanov, result, &plain).time_gates,
            None
        );
    }

    #[test]
    fn test_rounding_is_display_only() {
        let report = report();
        assert_eq!(report.rounded(27.98041), 27.98);
        assert_eq!(report.fastest().unwrap().time, 27.98041);
        let rendered = report.to_string();
        assert!(rendered.contains("27.98"));
        assert!(rendered.contains("D: 6, k: 8, d: 3"));
        assert!(rendered.contains("F5"));
        assert!(rendered.contains("No feasible parameters for Lokshtanov"));

        let asymptotic = EstimatorReport {
            measure: TimeMeasure::TildeO,
            ..report
        };
        assert!(asymptotic.to_string().contains("time (Õ)"));
    }

    #[test]
    fn test_accessors() {
        let report = report();
        assert_eq!(report.len(), 2);
        assert!(!report.is_empty());
        assert_eq!(report.fastest().unwrap().algorithm, AlgorithmKind::Crossbred);
        assert!(report.row(AlgorithmKind::Kpg).is_none());
    }
}
