//! Ensemble MCMC sampling.
//!
//! - `ensemble`: stretch-move sampler with a rayon worker pool
//! - `chain`: the sampled states, log-probabilities and acceptance counts

pub mod chain;
pub mod ensemble;

pub use chain::*;
pub use ensemble::*;
