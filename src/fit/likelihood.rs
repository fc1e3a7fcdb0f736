//! Gaussian log-likelihood.
//!
//! For θ with orbital head `(log10K, log10P, t0, ω, log10e)` and offsets
//! `vz_i`, each dataset contributes
//!
//! ```text
//! −½ Σ_j [ (rv_j − model_j)² / σ_j² + ln(2π σ_j²) ]
//! ```
//!
//! where `model_j` is the orbit curve evaluated with `vz = vz_i`. The total is
//! the plain sum over datasets.

use std::f64::consts::PI;

use crate::domain::{Dataset, OrbitalElements, N_ORBITAL};
use crate::error::EstimateError;
use crate::fit::estimator::OrbitalParams;
use crate::models::OrbitModel;

impl<M: OrbitModel> OrbitalParams<M> {
    /// Log-likelihood of θ over all datasets.
    ///
    /// Bounds are not consulted here; see [`OrbitalParams::lnprob`].
    pub fn lnlike(&self, theta: &[f64]) -> Result<f64, EstimateError> {
        self.layout.check(theta)?;
        let elements = OrbitalElements::from_slice(&theta[..N_ORBITAL]);

        let mut total = 0.0;
        for (i, data) in self.datasets.iter().enumerate() {
            let vz = theta[self.layout.offset_index(i)];
            total += self.dataset_lnlike(&elements, vz, data)?;
        }
        Ok(total)
    }

    /// Contribution of dataset `index` alone.
    pub fn lnlike_dataset(&self, theta: &[f64], index: usize) -> Result<f64, EstimateError> {
        self.layout.check(theta)?;
        let data = self.datasets.get(index).ok_or_else(|| {
            EstimateError::config(format!(
                "dataset index {index} out of range for {} datasets",
                self.datasets.len()
            ))
        })?;
        let elements = OrbitalElements::from_slice(&theta[..N_ORBITAL]);
        self.dataset_lnlike(&elements, theta[self.layout.offset_index(index)], data)
    }

    fn dataset_lnlike(
        &self,
        elements: &OrbitalElements,
        vz: f64,
        data: &Dataset,
    ) -> Result<f64, EstimateError> {
        let model = self.model.radial_velocities(elements, vz, data.t())?;
        Ok(gaussian_lnlike(data.rv(), &model, data.rv_err()))
    }
}

pub(crate) fn gaussian_lnlike(observed: &[f64], model: &[f64], sigma: &[f64]) -> f64 {
    -0.5 * observed
        .iter()
        .zip(model)
        .zip(sigma)
        .map(|((y, m), s)| {
            let var = s * s;
            (y - m).powi(2) / var + (2.0 * PI * var).ln()
        })
        .sum::<f64>()
}
