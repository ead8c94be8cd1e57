//! Series engine: Hilbert series of generic quadratic systems and monomial counts.
//!
//! The Hilbert series of `m` generic quadratic polynomials in `n` variables over `F_q`, once the
//! field equations `x^q = x` are taken into account, is the rational function
//!
//! ```text
//! H(z) = (1 - z^2)^m (1 - z^q)^n / ((1 - z^{2q})^m (1 - z)^n)
//! ```
//!
//! which collapses to `(1 + z)^n / (1 + z^2)^m` over `F_2`. Equations of degree `d_i` replace
//! the quadratic factors with `(1 - z^{d_i}) / (1 - z^{q·d_i})`.
//!
//! Coefficients are produced one degree at a time from the linear recurrence of the quotient,
//! over exact big integers, so the degree searches stop as soon as their condition holds and
//! never allocate beyond the degree cap.

use std::collections::BTreeMap;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};
use tracing::trace;

use crate::arith::{binomial, sum_of_binomials};
use crate::error::{EstimatorError, Result};

/// A formal power series truncated to a fixed number of leading coefficients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TruncatedSeries {
    coefficients: Vec<BigInt>,
}

impl TruncatedSeries {
    pub fn from_coefficients(coefficients: Vec<BigInt>) -> Self {
        Self { coefficients }
    }

    /// `(1 + sign·z^step)^exponent` truncated to `precision` terms.
    pub fn binomial_power(step: u64, exponent: usize, negative: bool, precision: usize) -> Self {
        let mut coefficients = vec![BigInt::zero(); precision];
        for i in 0..=exponent {
            let degree = match step.checked_mul(i as u64) {
                Some(d) if d < precision as u64 => d as usize,
                _ => break,
            };
            let magnitude = BigInt::from(binomial(exponent, i));
            coefficients[degree] = if negative && i % 2 == 1 {
                -magnitude
            } else {
                magnitude
            };
        }
        Self { coefficients }
    }

    pub fn precision(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficient(&self, degree: usize) -> BigInt {
        self.coefficients
            .get(degree)
            .cloned()
            .unwrap_or_else(BigInt::zero)
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.coefficients
    }

    /// Product truncated to the smaller of the two precisions.
    pub fn mul(&self, other: &TruncatedSeries) -> TruncatedSeries {
        let precision = self.precision().min(other.precision());
        let mut coefficients = vec![BigInt::zero(); precision];
        for (i, a) in self.coefficients.iter().enumerate().take(precision) {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coefficients.iter().enumerate().take(precision - i) {
                if !b.is_zero() {
                    coefficients[i + j] += a * b;
                }
            }
        }
        TruncatedSeries { coefficients }
    }

    /// Running sums, i.e. the series multiplied by `1 / (1 - z)`.
    pub fn cumulative(&self) -> TruncatedSeries {
        let mut running = BigInt::zero();
        let coefficients = self
            .coefficients
            .iter()
            .map(|c| {
                running += c;
                running.clone()
            })
            .collect();
        TruncatedSeries { coefficients }
    }
}

/// Quotient `numerator / denominator` of two truncated series whose denominator has constant
/// term one, expanded lazily.
#[derive(Clone, Debug)]
pub struct RationalSeries {
    numerator: TruncatedSeries,
    denominator: Vec<(usize, BigInt)>,
}

impl RationalSeries {
    pub fn new(numerator: TruncatedSeries, denominator: &TruncatedSeries) -> Self {
        let denominator = denominator
            .coefficients()
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| !c.is_zero())
            .map(|(d, c)| (d, c.clone()))
            .collect();
        Self {
            numerator,
            denominator,
        }
    }

    /// Hilbert series of `m` generic quadratic forms in `n` variables over `F_q`, expanded up
    /// to `precision` coefficients.
    pub fn hilbert(nvariables: usize, npolynomials: usize, q: u64, precision: usize) -> Self {
        if q == 2 {
            let numerator = TruncatedSeries::binomial_power(1, nvariables, false, precision);
            let denominator = TruncatedSeries::binomial_power(2, npolynomials, false, precision);
            return Self::new(numerator, &denominator);
        }
        let numerator = TruncatedSeries::binomial_power(2, npolynomials, true, precision).mul(
            &TruncatedSeries::binomial_power(q, nvariables, true, precision),
        );
        let denominator =
            TruncatedSeries::binomial_power(q.saturating_mul(2), npolynomials, true, precision)
                .mul(&TruncatedSeries::binomial_power(1, nvariables, true, precision));
        Self::new(numerator, &denominator)
    }

    /// Hilbert series of generic equations of the given `degrees` in `n` variables over `F_q`.
    pub fn hilbert_for_degrees(
        nvariables: usize,
        degrees: &[u64],
        q: u64,
        precision: usize,
    ) -> Self {
        if degrees.iter().all(|&d| d == 2) {
            return Self::hilbert(nvariables, degrees.len(), q, precision);
        }
        let mut grouped = BTreeMap::new();
        for &d in degrees {
            *grouped.entry(d).or_insert(0usize) += 1;
        }
        let mut numerator = TruncatedSeries::binomial_power(q, nvariables, true, precision);
        let mut denominator = TruncatedSeries::binomial_power(1, nvariables, true, precision);
        for (d, count) in grouped {
            numerator = numerator.mul(&TruncatedSeries::binomial_power(d, count, true, precision));
            denominator = denominator.mul(&TruncatedSeries::binomial_power(
                d.saturating_mul(q),
                count,
                true,
                precision,
            ));
        }
        Self::new(numerator, &denominator)
    }

    pub fn precision(&self) -> usize {
        self.numerator.precision()
    }

    pub fn coefficients(&self) -> SeriesCoefficients<'_> {
        SeriesCoefficients {
            series: self,
            computed: Vec::new(),
        }
    }

    pub fn truncate(&self) -> TruncatedSeries {
        TruncatedSeries::from_coefficients(self.coefficients().collect())
    }
}

/// Iterator over the coefficients of a [`RationalSeries`], one degree per step.
pub struct SeriesCoefficients<'a> {
    series: &'a RationalSeries,
    computed: Vec<BigInt>,
}

impl Iterator for SeriesCoefficients<'_> {
    type Item = BigInt;

    fn next(&mut self) -> Option<BigInt> {
        let degree = self.computed.len();
        if degree >= self.series.precision() {
            return None;
        }
        // h_d = a_d - sum_{j >= 1} b_j h_{d-j}
        let mut value = self.series.numerator.coefficient(degree);
        for (j, b) in &self.series.denominator {
            if *j > degree {
                break;
            }
            value -= b * &self.computed[degree - j];
        }
        self.computed.push(value.clone());
        Some(value)
    }
}

/// Rule used to count monomials once the field equations cap every exponent at `q - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonomialRule {
    /// Over `F_2` only square-free monomials survive.
    Boolean,
    BoundedExponent { q: u64 },
}

impl MonomialRule {
    pub fn for_field(q: u64) -> Self {
        if q == 2 {
            MonomialRule::Boolean
        } else {
            MonomialRule::BoundedExponent { q }
        }
    }
}

/// Counts monomials in a fixed number of variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonomialCounter {
    nvariables: usize,
    rule: MonomialRule,
}

impl MonomialCounter {
    pub fn new(nvariables: usize, q: u64) -> Self {
        Self {
            nvariables,
            rule: MonomialRule::for_field(q),
        }
    }

    pub fn nvariables(&self) -> usize {
        self.nvariables
    }

    /// Number of monomials of exact degree `degree`.
    pub fn of_degree(&self, degree: usize) -> BigUint {
        let n = self.nvariables;
        if n == 0 {
            return if degree == 0 {
                BigUint::one()
            } else {
                BigUint::zero()
            };
        }
        match self.rule {
            MonomialRule::Boolean => binomial(n, degree),
            MonomialRule::BoundedExponent { q } => {
                inclusion_exclusion(n, q, degree, |rest| binomial(rest + n - 1, n - 1))
            }
        }
    }

    /// Number of monomials of degree at most `degree`.
    pub fn up_to_degree(&self, degree: usize) -> BigUint {
        let n = self.nvariables;
        if n == 0 {
            return BigUint::one();
        }
        match self.rule {
            MonomialRule::Boolean => sum_of_binomials(n, degree),
            MonomialRule::BoundedExponent { q } => {
                inclusion_exclusion(n, q, degree, |rest| binomial(rest + n, n))
            }
        }
    }

    /// Exact-degree counts for degrees `0..len`.
    pub fn by_degree(&self, len: usize) -> Vec<BigUint> {
        (0..len).map(|d| self.of_degree(d)).collect()
    }
}

/// `sum_j (-1)^j C(n, j) f(degree - q·j)` over the `j` with `q·j ≤ degree`.
fn inclusion_exclusion<F>(n: usize, q: u64, degree: usize, f: F) -> BigUint
where
    F: Fn(usize) -> BigUint,
{
    let mut total = BigInt::zero();
    let terms = ((degree as u64) / q).min(n as u64) as usize;
    for j in 0..=terms {
        let term = BigInt::from(binomial(n, j) * f(degree - (q as usize) * j));
        if j % 2 == 0 {
            total += term;
        } else {
            total -= term;
        }
    }
    total.to_biguint().unwrap_or_else(BigUint::zero)
}

/// Degree searches over Hilbert series, bounded by a maximum degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeriesEngine {
    max_degree: usize,
}

impl SeriesEngine {
    pub fn new(max_degree: usize) -> Self {
        Self { max_degree }
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn hilbert_series(&self, nvariables: usize, npolynomials: usize, q: u64) -> RationalSeries {
        RationalSeries::hilbert(nvariables, npolynomials, q, self.max_degree + 1)
    }

    /// The first `count` Hilbert coefficients, independent of the degree cap.
    pub fn hilbert_coefficients(
        &self,
        nvariables: usize,
        npolynomials: usize,
        q: u64,
        count: usize,
    ) -> Vec<BigInt> {
        RationalSeries::hilbert(nvariables, npolynomials, q, count)
            .coefficients()
            .collect()
    }

    /// Smallest degree whose Hilbert coefficient is non-positive.
    pub fn degree_of_regularity(
        &self,
        nvariables: usize,
        npolynomials: usize,
        q: u64,
    ) -> Result<usize> {
        let series = self.hilbert_series(nvariables, npolynomials, q);
        self.first_non_positive(&series, nvariables, npolynomials, q)
    }

    /// Degree of regularity of equations with arbitrary `degrees`.
    pub fn degree_of_regularity_for_degrees(
        &self,
        nvariables: usize,
        degrees: &[u64],
        q: u64,
    ) -> Result<usize> {
        let series =
            RationalSeries::hilbert_for_degrees(nvariables, degrees, q, self.max_degree + 1);
        self.first_non_positive(&series, nvariables, degrees.len(), q)
    }

    fn first_non_positive(
        &self,
        series: &RationalSeries,
        nvariables: usize,
        npolynomials: usize,
        q: u64,
    ) -> Result<usize> {
        let degree = series
            .coefficients()
            .position(|c| !c.is_positive())
            .ok_or(EstimatorError::NoRegularityFound {
                nvariables,
                npolynomials,
                max_degree: self.max_degree,
            })?;
        trace!(nvariables, npolynomials, q, degree, "degree of regularity");
        Ok(degree)
    }

    /// Smallest degree at which the running sum of the Hilbert series is non-positive.
    pub fn witness_degree(&self, nvariables: usize, npolynomials: usize, q: u64) -> Result<usize> {
        let series = self.hilbert_series(nvariables, npolynomials, q);
        let mut running = BigInt::zero();
        let degree = series
            .coefficients()
            .position(|c| {
                running += c;
                !running.is_positive()
            })
            .ok_or(EstimatorError::NoRegularityFound {
                nvariables,
                npolynomials,
                max_degree: self.max_degree,
            })?;
        trace!(nvariables, npolynomials, q, degree, "witness degree");
        Ok(degree)
    }
}
