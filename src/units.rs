//! Conversions from field-operation and field-element exponents to gate and bit exponents.

use crate::error::{EstimatorError, Result};
use crate::instance::FieldOrder;

fn check_field(q: u64) -> Result<()> {
    FieldOrder::factor(q).map(|_| ()).ok_or_else(|| {
        EstimatorError::InvalidInstance(format!("field size {} is not a prime power", q))
    })
}

/// log2 of the gates spent on one field operation: `2·log2(q)^θ + log2(q)`.
pub(crate) fn gates_per_operation(q: u64, theta: f64) -> f64 {
    let width = (q as f64).log2();
    (2.0 * width.powf(theta) + width).log2()
}

/// log2 of the bits of one field element.
pub(crate) fn bits_per_element(q: u64) -> f64 {
    (q as f64).log2().ceil().log2()
}

/// Turns `2^x` field operations into a log2 gate count.
pub fn ngates(q: u64, x: f64, theta: f64) -> Result<f64> {
    check_field(q)?;
    Ok(x + gates_per_operation(q, theta))
}

/// Turns `2^x` field elements into a log2 bit count.
pub fn nbits(q: u64, x: f64) -> Result<f64> {
    check_field(q)?;
    Ok(x + bits_per_element(q))
}
