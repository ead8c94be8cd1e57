use serde::Serialize;
use thiserror::Error;

use crate::algorithms::AlgorithmKind;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum EstimatorError {
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),

    #[error("{algorithm} is not applicable: {reason}")]
    NotApplicable {
        algorithm: AlgorithmKind,
        reason: String,
    },

    #[error("Parameters out of domain for {algorithm}: {reason}")]
    ParameterOutOfDomain {
        algorithm: AlgorithmKind,
        reason: String,
    },

    #[error("No feasible parameters for {algorithm}: {reason}")]
    NoFeasibleParameters {
        algorithm: AlgorithmKind,
        reason: String,
    },

    #[error(
        "No non-positive series coefficient for {nvariables} variables and {npolynomials} \
         polynomials up to degree {max_degree}"
    )]
    NoRegularityFound {
        nvariables: usize,
        npolynomials: usize,
        max_degree: usize,
    },

    #[error("No evaluable algorithm matches the selection")]
    EmptySelection,
}

impl EstimatorError {
    pub(crate) fn out_of_domain(algorithm: AlgorithmKind, reason: impl Into<String>) -> Self {
        EstimatorError::ParameterOutOfDomain {
            algorithm,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_applicable(algorithm: AlgorithmKind, reason: impl Into<String>) -> Self {
        EstimatorError::NotApplicable {
            algorithm,
            reason: reason.into(),
        }
    }

    pub(crate) fn infeasible(algorithm: AlgorithmKind, reason: impl Into<String>) -> Self {
        EstimatorError::NoFeasibleParameters {
            algorithm,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
