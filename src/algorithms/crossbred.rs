//! Crossbred algorithm of Joux and Vitse.
//!
//! For parameters `(D, k, d)` the algorithm builds the degree-`D` Macaulay matrix, eliminates
//! every monomial of degree above `d` in the first `k` variables, and then for each of the
//! `q^(n-k)` assignments of the remaining variables solves a linear system in the monomials of
//! degree at most `d` in `k` variables. A point is admissible when the series
//!
//! ```text
//! S(D, k, d) = sum_{j <= d} H_k[j]·Mon_{n-k}(<= D-j) - sum_{i <= D} H_n[i] - sum_{i <= d} H_k[i]
//! ```
//!
//! non-negative, i.e. enough linearly independent polynomials survive the elimination.
//!
//! Everything `(D, k, d)` needs is tabulated once per `k` up to the largest `D`, so a single
//! point costs `O(D)` big-integer operations.

use std::sync::OnceLock;

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};
use rayon::prelude::*;

use super::ModelContext;
use crate::algorithms::AlgorithmKind;
use crate::arith::{log2, log2_add, pow};
use crate::error::{EstimatorError, Result};
use crate::optimizer::{Complexity, ComplexityModel, Optimizer};
use crate::params::{Domain, ParameterPoint, ParameterSchema};
use crate::series::MonomialCounter;

#[derive(Debug)]
pub struct Crossbred {
    pub(super) ctx: ModelContext,
    pub(super) optimizer: Optimizer,
    tables: OnceLock<Tables>,
}

/// Series prefixes for one split into `k` kept and `n - k` enumerated variables, indexed by
/// degree.
#[derive(Debug)]
struct Slice {
    hilbert: Vec<BigInt>,
    hilbert_cumulative: Vec<BigInt>,
    kept: Vec<BigUint>,
    kept_cumulative: Vec<BigUint>,
    enumerated_cumulative: Vec<BigUint>,
}

#[derive(Debug)]
struct Tables {
    full_cumulative: Vec<BigInt>,
    /// Entry `k - 1` holds the slice for `k` kept variables.
    slices: Vec<Slice>,
}

fn running_sum<T: Clone + for<'a> std::ops::AddAssign<&'a T>>(values: &[T], zero: T) -> Vec<T> {
    let mut acc = zero;
    values
        .iter()
        .map(|v| {
            acc += v;
            acc.clone()
        })
        .collect()
}

impl Crossbred {
    pub(super) fn new(ctx: ModelContext, optimizer: Optimizer) -> Self {
        Self {
            ctx,
            optimizer,
            tables: OnceLock::new(),
        }
    }

    /// Largest `D` swept: the reduced variable count, lowered by any override.
    pub fn max_degree(&self) -> usize {
        let n = self.ctx.instance.nvariables_reduced() as u64;
        self.ctx.cap(n).min(n) as usize
    }

    fn tables(&self) -> &Tables {
        self.tables.get_or_init(|| {
            let instance = &self.ctx.instance;
            let q = instance.q();
            let n = instance.nvariables_reduced();
            let m = instance.npolynomials_reduced();
            let len = self.max_degree() + 1;
            let series = &self.ctx.series;

            let full = series.hilbert_coefficients(n, m, q, len);
            let slices = (1..n.max(1))
                .into_par_iter()
                .map(|k| {
                    let hilbert = series.hilbert_coefficients(k, m, q, len);
                    let kept = MonomialCounter::new(k, q).by_degree(len);
                    let enumerated = MonomialCounter::new(n - k, q).by_degree(len);
                    Slice {
                        hilbert_cumulative: running_sum(&hilbert, BigInt::zero()),
                        kept_cumulative: running_sum(&kept, BigUint::zero()),
                        enumerated_cumulative: running_sum(&enumerated, BigUint::zero()),
                        hilbert,
                        kept,
                    }
                })
                .collect();

            Tables {
                full_cumulative: running_sum(&full, BigInt::zero()),
                slices,
            }
        })
    }

    fn unpack(&self, point: &ParameterPoint) -> Result<(usize, usize, usize)> {
        let kind = self.kind();
        let get = |name: &str| {
            point
                .integer(name)
                .map(|v| v as usize)
                .ok_or_else(|| EstimatorError::out_of_domain(kind, format!("missing {}", name)))
        };
        Ok((get("D")?, get("k")?, get("d")?))
    }

    fn slice(&self, k: usize) -> Option<&Slice> {
        self.tables().slices.get(k.checked_sub(1)?)
    }

    /// Rows left after eliminating the monomials of degree above `d` in the kept variables.
    fn surviving_rows(&self, degree: usize, k: usize, d: usize) -> Option<BigUint> {
        let slice = self.slice(k)?;
        let mut total = BigUint::zero();
        for dk in (d + 1)..degree {
            total += &slice.kept[dk] * &slice.enumerated_cumulative[degree - 1 - dk];
        }
        Some(total)
    }
}

impl ComplexityModel for Crossbred {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Crossbred
    }

    fn schema(&self) -> ParameterSchema {
        let n = self.ctx.instance.nvariables_reduced() as u64;
        let max_degree = self.max_degree() as u64;
        ParameterSchema::empty()
            .with(
                "D",
                Domain::Integer {
                    min: 2,
                    max: max_degree,
                },
            )
            .with("k", Domain::Integer { min: 1, max: n - 1 })
            .with(
                "d",
                Domain::Integer {
                    min: 1,
                    max: max_degree.saturating_sub(1),
                },
            )
    }

    fn admissible(&self, point: &ParameterPoint) -> bool {
        let Ok((degree, k, d)) = self.unpack(point) else {
            return false;
        };
        if d >= degree {
            return false;
        }
        let Some(slice) = self.slice(k) else {
            return false;
        };
        let mut independent = BigInt::zero();
        for j in 0..=d {
            independent +=
                &slice.hilbert[j] * BigInt::from(slice.enumerated_cumulative[degree - j].clone());
        }
        independent -= &self.tables().full_cumulative[degree];
        independent -= &slice.hilbert_cumulative[d];
        if independent.is_negative() {
            return false;
        }
        self.surviving_rows(degree, k, d)
            .map_or(false, |rows| rows > BigUint::from(2u32))
    }

    fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
        let instance = &self.ctx.instance;
        let (degree, k, d) = self.unpack(point)?;
        let q = instance.q();
        let n = instance.nvariables_reduced();
        let m = instance.npolynomials_reduced();

        let outside = || EstimatorError::out_of_domain(self.kind(), "point outside the tables");
        let rows = self.surviving_rows(degree, k, d).ok_or_else(outside)?;
        let slice = self.slice(k).ok_or_else(outside)?;
        let linear = &slice.kept_cumulative[d];

        let rows_squared = &rows * &rows;
        let linear_squared = linear * linear;
        // sparse elimination of the Macaulay matrix, then one dense solve per guess
        let time = log2(&(&rows_squared + BigUint::from(m) * pow(q, n - k) * &linear_squared));
        let memory = log2(&(rows_squared + linear_squared));

        Ok(Complexity { time, memory })
    }

    fn tilde_o_time(&self, point: &ParameterPoint) -> Result<f64> {
        let instance = &self.ctx.instance;
        let (degree, k, d) = self.unpack(point)?;
        let outside = || EstimatorError::out_of_domain(self.kind(), "point outside the tables");
        let rows = self.surviving_rows(degree, k, d).ok_or_else(outside)?;
        let slice = self.slice(k).ok_or_else(outside)?;
        let enumeration = (instance.nvariables_reduced() - k) as f64 * (instance.q() as f64).log2();
        Ok(log2_add(
            2.0 * log2(&rows),
            enumeration + instance.w() * log2(&slice.kept_cumulative[d]),
        ))
    }

    fn time_lower_bound(&self, prefix: &ParameterPoint) -> Option<f64> {
        let instance = &self.ctx.instance;
        let k = prefix.integer("k")? as usize;
        let remaining = instance.nvariables_reduced().checked_sub(k)?;
        // the M·q^(N-k) enumeration term alone, since every other term is non-negative
        let enumeration = remaining as f64 * (instance.q() as f64).log2();
        Some((instance.npolynomials_reduced() as f64).log2() + enumeration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Algorithm;
    use crate::config::EstimatorConfig;
    use crate::instance::ProblemInstance;
    use crate::optimizer::Optimizer;
    use std::sync::Arc;

    fn point(degree: u64, k: u64, d: u64) -> ParameterPoint {
        ParameterPoint::new()
            .with("D", degree)
            .with("k", k)
            .with("d", d)
    }

    #[test]
    fn test_reference_scenario() {
        let algorithm = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::new(31, 15, 10).unwrap(),
        );
        assert!((algorithm.time_complexity().unwrap() - 27.9804).abs() < 1e-2);
        assert!((algorithm.memory_complexity().unwrap() - 21.6109).abs() < 1e-2);
        let parameters = algorithm.optimal_parameters().unwrap();
        assert_eq!(parameters, point(6, 8, 3));
    }

    #[test]
    fn test_other_fields() {
        let algorithm = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::builder(5, 10, 12).w(2.0).build().unwrap(),
        );
        assert!((algorithm.time_complexity().unwrap() - 19.5699).abs() < 1e-2);
        assert!((algorithm.memory_complexity().unwrap() - 19.3801).abs() < 1e-2);
        assert_eq!(algorithm.optimal_parameters().unwrap(), point(5, 7, 1));

        let boolean = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::new(2, 15, 15).unwrap(),
        );
        assert!((boolean.time_complexity().unwrap() - 17.672).abs() < 1e-2);
        assert_eq!(boolean.optimal_parameters().unwrap(), point(4, 9, 1));
    }

    #[test]
    fn test_zero_surplus_is_admissible() {
        let algorithm = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::new(2, 8, 8).unwrap(),
        );
        assert!((algorithm.time_complexity().unwrap() - 10.8082).abs() < 1e-2);
        assert!((algorithm.memory_complexity().unwrap() - 8.0980).abs() < 1e-2);
        assert_eq!(algorithm.optimal_parameters().unwrap(), point(3, 6, 1));
        assert!((algorithm.tilde_o_time().unwrap() - 10.1959).abs() < 1e-2);
    }

    #[test]
    fn test_tilde_o_time() {
        let algorithm = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::new(31, 15, 10).unwrap(),
        );
        assert!((algorithm.tilde_o_time().unwrap() - 30.6106).abs() < 1e-2);
        let boolean = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::new(2, 15, 15).unwrap(),
        );
        assert!((boolean.tilde_o_time().unwrap() - 17.2346).abs() < 1e-2);
    }

    #[test]
    fn test_oversized_outer_bound_is_clamped() {
        let instance = Arc::new(ProblemInstance::new(31, 15, 10).unwrap());
        let config =
            EstimatorConfig::default().with_outer_bound(AlgorithmKind::Crossbred, u64::MAX);
        let Algorithm::Crossbred(model) =
            Algorithm::new(AlgorithmKind::Crossbred, instance, &config)
        else {
            unreachable!()
        };
        assert_eq!(model.max_degree(), 10);
    }

    #[test]
    fn test_outer_bound_caps_degree() {
        let instance = Arc::new(ProblemInstance::new(31, 15, 10).unwrap());
        let config = EstimatorConfig::default().with_outer_bound(AlgorithmKind::Crossbred, 5);
        let algorithm = Algorithm::new(AlgorithmKind::Crossbred, instance, &config);
        assert!((algorithm.time_complexity().unwrap() - 31.9983).abs() < 1e-2);
        assert!((algorithm.memory_complexity().unwrap() - 15.8361).abs() < 1e-2);
        assert_eq!(algorithm.optimal_parameters().unwrap(), point(5, 7, 3));
    }

    #[test]
    fn test_memory_bound_moves_the_optimum() {
        let instance = ProblemInstance::builder(31, 15, 10)
            .memory_bound(20.0)
            .build()
            .unwrap();
        let algorithm = Algorithm::for_instance(AlgorithmKind::Crossbred, instance);
        let result = algorithm.optimize().unwrap();
        assert!(result.memory <= 20.0);
        assert!((result.time - 31.1333).abs() < 1e-2);
        assert_eq!(result.parameters, point(6, 8, 4));
    }

    #[test]
    fn test_explicit_points() {
        let algorithm = Algorithm::for_instance(
            AlgorithmKind::Crossbred,
            ProblemInstance::new(31, 15, 10).unwrap(),
        );
        let time = algorithm.time_complexity_at(&point(6, 8, 3)).unwrap();
        assert!((time - 27.9804).abs() < 1e-2);
        // d must stay below D
        assert!(matches!(
            algorithm.time_complexity_at(&point(3, 8, 3)),
            Err(EstimatorError::ParameterOutOfDomain { .. })
        ));
        assert!(matches!(
            algorithm.time_complexity_at(&point(11, 8, 3)),
            Err(EstimatorError::ParameterOutOfDomain { .. })
        ));
    }

    #[test]
    fn test_pruning_matches_full_enumeration() {
        let instance = Arc::new(ProblemInstance::new(31, 15, 10).unwrap());
        let config = EstimatorConfig::default();
        let Algorithm::Crossbred(model) =
            Algorithm::new(AlgorithmKind::Crossbred, instance, &config)
        else {
            unreachable!()
        };

        struct Unpruned<'a>(&'a Crossbred);
        impl ComplexityModel for Unpruned<'_> {
            fn kind(&self) -> AlgorithmKind {
                self.0.kind()
            }
            fn schema(&self) -> ParameterSchema {
                self.0.schema()
            }
            fn admissible(&self, point: &ParameterPoint) -> bool {
                self.0.admissible(point)
            }
            fn evaluate(&self, point: &ParameterPoint) -> Result<Complexity> {
                self.0.evaluate(point)
            }
        }

        let optimizer = Optimizer::new();
        assert_eq!(
            optimizer.minimize(&model).unwrap(),
            optimizer.minimize(&Unpruned(&model)).unwrap()
        );
    }
}
