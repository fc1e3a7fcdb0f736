//! Bounded minimization used by the maximum-likelihood driver.
//!
//! - `transform`: box-to-real reparameterization
//! - `minimizer`: the `BoundedMinimizer` contract and its Nelder–Mead implementation

pub mod minimizer;
pub mod transform;

pub use minimizer::*;
pub use transform::*;
