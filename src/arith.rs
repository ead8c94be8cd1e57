//! Exact combinatorial quantities and their conversion to base-2 exponents.
//!
//! Every complexity formula is evaluated over arbitrary-precision integers (or rationals when a
//! power of two with a negative exponent appears) and only the final magnitude is turned into a
//! `log2`. Terms that carry an irrational factor such as `log2(n)` are combined with
//! [`log2_add`], which works directly on exponents.

use num_bigint::BigUint;
use num_rational::{BigRational, Rational64};
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Binomial coefficient `C(n, k)`, zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    let k = k.min(n - k);
    let mut acc = BigUint::one();
    for i in 0..k {
        // acc == C(n, i) here, so the division is exact
        acc = acc * BigUint::from(n - i) / BigUint::from(i + 1);
    }
    acc
}

/// `SB(n, l) = C(n, 0) + C(n, 1) + ... + C(n, l)`.
pub fn sum_of_binomials(n: usize, l: usize) -> BigUint {
    let mut total = BigUint::zero();
    let mut term = BigUint::one();
    for j in 0..=l.min(n) {
        if j > 0 {
            term = term * BigUint::from(n - j + 1) / BigUint::from(j);
        }
        total += &term;
    }
    total
}

pub fn pow(base: u64, exponent: usize) -> BigUint {
    num_traits::pow(BigUint::from(base), exponent)
}

/// Base-2 logarithm of an exact non-negative integer, `-inf` for zero.
pub fn log2(value: &BigUint) -> f64 {
    let bits = value.bits();
    if bits == 0 {
        return f64::NEG_INFINITY;
    }
    if bits <= 64 {
        return value.to_u64().map_or(f64::NAN, |v| (v as f64).log2());
    }
    let shift = bits - 64;
    let top = (value >> shift).to_u64().map_or(f64::NAN, |v| v as f64);
    top.log2() + shift as f64
}

/// Base-2 logarithm of a positive rational, `-inf` for anything non-positive.
pub fn log2_ratio(value: &BigRational) -> f64 {
    if !value.is_positive() {
        return f64::NEG_INFINITY;
    }
    log2(value.numer().magnitude()) - log2(value.denom().magnitude())
}

/// `log2(2^a + 2^b)` without leaving the exponent domain.
pub fn log2_add(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (1.0 + (lo - hi).exp2()).log2()
}

/// `⌊ratio · n⌋` for a non-negative ratio, computed exactly.
pub fn floor_scaled(ratio: Rational64, n: usize) -> usize {
    let scaled = (ratio * Rational64::from_integer(n as i64)).floor();
    scaled.to_integer().max(0) as usize
}

/// `log2(log_base(n))`, taken as zero when `n ≤ 1` so a single variable costs one step.
pub fn log2_log(n: usize, base: f64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    ((n as f64).ln() / base.ln()).log2()
}
