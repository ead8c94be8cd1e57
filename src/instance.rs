//! Problem instances: an MQ system shape plus the global estimation constants.

use serde::Serialize;

use crate::error::{EstimatorError, Result};

/// Default exponent of dense linear algebra (Strassen).
pub const DEFAULT_LINEAR_ALGEBRA_CONSTANT: f64 = 2.81;

/// Order of a finite field written as `p^degree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FieldOrder {
    pub characteristic: u64,
    pub degree: u32,
}

impl FieldOrder {
    /// Factors `q` as a prime power, or returns `None` if it is not one.
    pub fn factor(q: u64) -> Option<Self> {
        if q < 2 {
            return None;
        }
        let mut characteristic = q;
        let mut p = 2u64;
        while p.saturating_mul(p) <= q {
            if q % p == 0 {
                characteristic = p;
                break;
            }
            p += if p == 2 { 1 } else { 2 };
        }
        let mut rest = q;
        let mut degree = 0;
        while rest % characteristic == 0 {
            rest /= characteristic;
            degree += 1;
        }
        (rest == 1).then_some(FieldOrder {
            characteristic,
            degree,
        })
    }
}

/// An MQ instance of `m` equations in `n` variables over `F_q`, quadratic unless explicit
/// degrees are given.
///
/// Immutable once built. Besides the raw shape it records the reduced system every generic
/// algorithm works on: `h` variables are fixed by guessing, and an underdetermined remainder
/// is shrunk with the Thomae–Wolf reduction (quadratic systems) or by fixing the surplus
/// variables (higher degrees).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProblemInstance {
    q: u64,
    nvariables: usize,
    npolynomials: usize,
    degrees: Vec<u64>,
    w: f64,
    theta: Option<f64>,
    h: usize,
    memory_bound: Option<f64>,
    nsolutions: u64,
    field: FieldOrder,
    nvariables_reduced: usize,
    npolynomials_reduced: usize,
}

impl ProblemInstance {
    /// Instance with default constants.
    pub fn new(q: u64, nvariables: usize, npolynomials: usize) -> Result<Self> {
        Self::builder(q, nvariables, npolynomials).build()
    }

    pub fn builder(q: u64, nvariables: usize, npolynomials: usize) -> ProblemInstanceBuilder {
        ProblemInstanceBuilder {
            q,
            nvariables,
            npolynomials,
            degrees: None,
            w: DEFAULT_LINEAR_ALGEBRA_CONSTANT,
            theta: None,
            h: 0,
            memory_bound: None,
            nsolutions: 1,
        }
    }

    pub fn q(&self) -> u64 {
        self.q
    }

    pub fn nvariables(&self) -> usize {
        self.nvariables
    }

    pub fn npolynomials(&self) -> usize {
        self.npolynomials
    }

    /// Degree of every equation.
    pub fn degrees(&self) -> &[u64] {
        &self.degrees
    }

    pub fn is_quadratic(&self) -> bool {
        self.degrees.iter().all(|&d| d == 2)
    }

    /// Degrees of the equations of the reduced system.
    pub fn degrees_reduced(&self) -> Vec<u64> {
        if self.is_quadratic() {
            vec![2; self.npolynomials_reduced]
        } else {
            self.degrees.clone()
        }
    }

    /// Linear algebra constant.
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Bit operations per field operation, when gate counts are requested.
    pub fn theta(&self) -> Option<f64> {
        self.theta
    }

    /// Number of variables fixed by guessing before any algorithm runs.
    pub fn h(&self) -> usize {
        self.h
    }

    /// Upper bound on log2 of the memory an optimized parameter point may use.
    pub fn memory_bound(&self) -> Option<f64> {
        self.memory_bound
    }

    pub fn nsolutions(&self) -> u64 {
        self.nsolutions
    }

    pub fn field(&self) -> FieldOrder {
        self.field
    }

    pub fn is_characteristic_two(&self) -> bool {
        self.field.characteristic == 2
    }

    /// Variable count once the `h` guessed variables are removed.
    pub fn nvariables_effective(&self) -> usize {
        self.nvariables - self.h
    }

    /// Variable count after guessing and Thomae–Wolf reduction.
    pub fn nvariables_reduced(&self) -> usize {
        self.nvariables_reduced
    }

    /// Equation count after guessing and Thomae–Wolf reduction.
    pub fn npolynomials_reduced(&self) -> usize {
        self.npolynomials_reduced
    }

    pub fn is_overdetermined(&self) -> bool {
        self.npolynomials > self.nvariables
    }

    pub fn is_underdetermined(&self) -> bool {
        self.npolynomials < self.nvariables
    }

    pub fn is_square(&self) -> bool {
        self.npolynomials == self.nvariables
    }

    /// Cost in log2 of guessing the `h` fixed variables.
    pub fn hybridization_cost(&self) -> f64 {
        self.h as f64 * (self.q as f64).log2()
    }
}

/// Thomae–Wolf: an underdetermined system of `m` equations in `n > m` variables is as hard as a
/// square one of `m - ⌊n/m⌋` (even `q`) or `m - ⌊n/m⌋ + 1` (odd `q`) equations.
fn thomae_wolf(q: u64, nvariables: usize, npolynomials: usize) -> (usize, usize) {
    if nvariables <= npolynomials {
        return (nvariables, npolynomials);
    }
    let alpha = nvariables / npolynomials;
    let reduced = if q % 2 == 0 {
        npolynomials.saturating_sub(alpha)
    } else {
        (npolynomials + 1).saturating_sub(alpha)
    };
    let reduced = reduced.max(1);
    (reduced, reduced)
}

#[derive(Clone, Debug)]
pub struct ProblemInstanceBuilder {
    q: u64,
    nvariables: usize,
    npolynomials: usize,
    degrees: Option<Vec<u64>>,
    w: f64,
    theta: Option<f64>,
    h: usize,
    memory_bound: Option<f64>,
    nsolutions: u64,
}

impl ProblemInstanceBuilder {
    /// Explicit equation degrees, one per polynomial.
    pub fn degrees(mut self, degrees: Vec<u64>) -> Self {
        self.degrees = Some(degrees);
        self
    }

    pub fn w(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    pub fn theta(mut self, theta: f64) -> Self {
        self.theta = Some(theta);
        self
    }

    pub fn h(mut self, h: usize) -> Self {
        self.h = h;
        self
    }

    pub fn memory_bound(mut self, bound: f64) -> Self {
        self.memory_bound = Some(bound);
        self
    }

    pub fn nsolutions(mut self, nsolutions: u64) -> Self {
        self.nsolutions = nsolutions;
        self
    }

    pub fn build(self) -> Result<ProblemInstance> {
        let field = FieldOrder::factor(self.q).ok_or_else(|| {
            EstimatorError::InvalidInstance(format!(
                "field size {} is not a prime power",
                self.q
            ))
        })?;
        if self.nvariables == 0 {
            return Err(EstimatorError::InvalidInstance(
                "number of variables must be positive".into(),
            ));
        }
        if self.npolynomials == 0 {
            return Err(EstimatorError::InvalidInstance(
                "number of polynomials must be positive".into(),
            ));
        }
        if !(2.0..=3.0).contains(&self.w) {
            return Err(EstimatorError::InvalidInstance(format!(
                "linear algebra constant {} outside [2, 3]",
                self.w
            )));
        }
        if let Some(theta) = self.theta {
            if !theta.is_finite() || theta < 0.0 {
                return Err(EstimatorError::InvalidInstance(format!(
                    "theta {} must be a non-negative real",
                    theta
                )));
            }
        }
        if let Some(bound) = self.memory_bound {
            if !bound.is_finite() {
                return Err(EstimatorError::InvalidInstance(
                    "memory bound must be finite".into(),
                ));
            }
        }
        if self.h >= self.nvariables {
            return Err(EstimatorError::InvalidInstance(format!(
                "cannot guess {} of {} variables",
                self.h, self.nvariables
            )));
        }
        if self.nsolutions == 0 {
            return Err(EstimatorError::InvalidInstance(
                "expected number of solutions must be positive".into(),
            ));
        }

        let degrees = self.degrees.unwrap_or_else(|| vec![2; self.npolynomials]);
        if degrees.len() != self.npolynomials {
            return Err(EstimatorError::InvalidInstance(format!(
                "{} degrees given for {} polynomials",
                degrees.len(),
                self.npolynomials
            )));
        }
        if degrees.contains(&0) {
            return Err(EstimatorError::InvalidInstance(
                "equation degrees must be positive".into(),
            ));
        }

        let effective = self.nvariables - self.h;
        let (nvariables_reduced, npolynomials_reduced) = if degrees.iter().all(|&d| d == 2) {
            thomae_wolf(self.q, effective, self.npolynomials)
        } else {
            (effective.min(self.npolynomials), self.npolynomials)
        };

        Ok(ProblemInstance {
            q: self.q,
            nvariables: self.nvariables,
            npolynomials: self.npolynomials,
            degrees,
            w: self.w,
            theta: self.theta,
            h: self.h,
            memory_bound: self.memory_bound,
            nsolutions: self.nsolutions,
            field,
            nvariables_reduced,
            npolynomials_reduced,
        })
    }
}
