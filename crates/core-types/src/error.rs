use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

/// Why a single (security, window) fit produced no usable coefficients.
///
/// These are values, not failures of the run. A `FitError` is stored inside the
/// `FitResult` for the affected window and never aborts other windows or
/// securities.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitError {
    #[error("Not enough price points in window: required {required}, found {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("History begins on {first_date}, after the window start")]
    IncompleteCoverage { first_date: NaiveDate },

    #[error("Solver did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("Solver produced non-finite or non-positive parameters")]
    NonFinite,
}
