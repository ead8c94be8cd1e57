//! Sizing square MQ systems for a target security level.
//!
//! The smallest system is the first square one whose HybridF5 cost reaches `2^level` field
//! operations, found by walking `m = 1, 2, ...`.

use tracing::debug;

use crate::algorithms::{Algorithm, AlgorithmKind};
use crate::error::{EstimatorError, Result};
use crate::instance::ProblemInstance;

/// Security levels, in bits, accepted by [`min_npolynomials`] and [`min_nvariables`].
pub const SECURITY_LEVELS: [u32; 5] = [80, 100, 128, 192, 256];

/// Largest system size the search tries before giving up.
const MAX_SYSTEM_SIZE: usize = 4096;

/// Smallest `m` such that HybridF5 on `m` equations in `m` variables over `F_q` costs at least
/// `2^security_level`.
pub fn min_npolynomials(security_level: u32, q: u64, w: f64) -> Result<usize> {
    if !SECURITY_LEVELS.contains(&security_level) {
        return Err(EstimatorError::InvalidInstance(format!(
            "security level {} is not one of {:?}",
            security_level, SECURITY_LEVELS
        )));
    }
    let level = f64::from(security_level);
    for m in 1..=MAX_SYSTEM_SIZE {
        let instance = ProblemInstance::builder(q, m, m).w(w).build()?;
        let time = Algorithm::for_instance(AlgorithmKind::HybridF5, instance).time_complexity()?;
        if time >= level {
            debug!(security_level, q, m, time, "minimal square system");
            return Ok(m);
        }
    }
    Err(EstimatorError::infeasible(
        AlgorithmKind::HybridF5,
        format!(
            "no square system up to {} equations reaches 2^{}",
            MAX_SYSTEM_SIZE, security_level
        ),
    ))
}

/// Smallest variable count of a square system reaching `2^security_level`.
pub fn min_nvariables(security_level: u32, q: u64, w: f64) -> Result<usize> {
    min_npolynomials(security_level, q, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sizes(level: u32, expected: [(u64, usize); 3]) {
        for (q, m) in expected {
            assert_eq!(min_npolynomials(level, q, 2.0).unwrap(), m, "level {} q {}", level, q);
        }
    }

    #[test]
    fn test_reference_sizes() {
        assert_sizes(80, [(16, 33), (31, 32), (256, 28)]);
        assert_sizes(100, [(16, 43), (31, 40), (256, 36)]);
        assert_sizes(128, [(16, 56), (31, 52), (256, 47)]);
    }

    #[test]
    fn test_reference_sizes_192() {
        assert_sizes(192, [(16, 86), (31, 80), (256, 72)]);
    }

    #[test]
    #[ignore = "sweeps systems of more than a hundred equations"]
    fn test_reference_sizes_256() {
        assert_sizes(256, [(16, 116), (31, 109), (256, 98)]);
    }

    #[test]
    fn test_square_systems_agree() {
        assert_eq!(
            min_nvariables(80, 256, 2.0).unwrap(),
            min_npolynomials(80, 256, 2.0).unwrap()
        );
    }

    #[test]
    fn test_rejects_unknown_levels_and_fields() {
        assert!(matches!(
            min_npolynomials(90, 16, 2.0),
            Err(EstimatorError::InvalidInstance(_))
        ));
        assert!(matches!(
            min_npolynomials(80, 15, 2.0),
            Err(EstimatorError::InvalidInstance(_))
        ));
        assert!(matches!(
            min_npolynomials(80, 16, 3.5),
            Err(EstimatorError::InvalidInstance(_))
        ));
    }
}
