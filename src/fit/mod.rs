//! Orbit estimation.
//!
//! Responsibilities:
//!
//! - validate the estimator inputs (datasets, guess, bounds)
//! - evaluate the Gaussian log-likelihood, flat prior and log-posterior
//! - run the maximum-likelihood and ensemble-sampling drivers

pub mod estimator;
pub mod likelihood;
pub mod mcmc;
pub mod ml;
pub mod posterior;
pub mod prior;

pub use estimator::*;
pub use mcmc::*;
pub use ml::*;
pub use prior::*;
