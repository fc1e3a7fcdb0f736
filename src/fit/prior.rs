//! Flat prior over the bound box.

use crate::domain::Bound;
use crate::error::EstimateError;
use crate::fit::estimator::OrbitalParams;
use crate::models::OrbitModel;

/// `0` when every θ_j lies strictly inside its bound, `−∞` otherwise.
///
/// A value exactly on an edge counts as outside, and so does NaN.
pub fn flat_prior(bounds: &[Bound], theta: &[f64]) -> f64 {
    let inside = bounds.len() == theta.len()
        && bounds.iter().zip(theta).all(|(b, &x)| b.contains(x));
    if inside { 0.0 } else { f64::NEG_INFINITY }
}

impl<M: OrbitModel> OrbitalParams<M> {
    /// Log-prior of θ against this estimator's bounds.
    pub fn lnprior(&self, theta: &[f64]) -> Result<f64, EstimateError> {
        self.layout.check(theta)?;
        Ok(flat_prior(&self.bounds, theta))
    }
}
