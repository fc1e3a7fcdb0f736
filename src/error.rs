//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<_, EstimateError>`. The binary maps
//! each variant to a process exit code via [`EstimateError::exit_code`].
//!
//! Non-convergence of the optimizer is *not* an error: it is reported through
//! the outcome's `success` flag and message.

use thiserror::Error;

use crate::models::OrbitError;

#[derive(Debug, Clone, Error)]
pub enum EstimateError {
    /// Invalid construction input (dataset count, guess length, bounds layout, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The orbit model rejected a parameter set.
    #[error("orbit model error: {0}")]
    Orbit(#[from] OrbitError),

    /// The minimizer framework failed to run (distinct from non-convergence).
    #[error("optimizer error: {0}")]
    Optimizer(String),

    /// Invalid sampler setup or a failure while sampling.
    #[error("sampler error: {0}")]
    Sampler(String),

    /// File system failure in the CLI layer.
    #[error("{0}")]
    Io(String),

    /// Malformed user input (CSV contents, CLI values).
    #[error("{0}")]
    Parse(String),
}

impl EstimateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            EstimateError::Configuration(_) | EstimateError::Io(_) | EstimateError::Parse(_) => 2,
            EstimateError::Orbit(_) | EstimateError::Optimizer(_) | EstimateError::Sampler(_) => 4,
        }
    }
}

impl From<argmin::core::Error> for EstimateError {
    fn from(err: argmin::core::Error) -> Self {
        // Objective failures travel through argmin as `anyhow` errors; recover
        // the original variant when there is one.
        match err.downcast::<EstimateError>() {
            Ok(inner) => inner,
            Err(other) => EstimateError::Optimizer(other.to_string()),
        }
    }
}
