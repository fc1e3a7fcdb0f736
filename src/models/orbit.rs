//! Radial-velocity curve of a Keplerian orbit.
//!
//! The estimator only relies on one primitive:
//! - predict `v(t)` at the observation times for given elements and a
//!   systemic velocity `vz`
//!
//! [`OrbitModel`] is that seam; [`KeplerOrbit`] is the closed-form model
//!
//! ```text
//! v(t) = vz + K [cos(ν(t) + ω) + e cos ω]
//! ```

use thiserror::Error;

use crate::domain::OrbitalElements;
use crate::math::{eccentric_anomaly, mean_anomaly, true_anomaly};

/// Orbit model failures on physically invalid elements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("eccentricity {0} outside [0, 1)")]
    Eccentricity(f64),
    #[error("period {0} must be finite and > 0")]
    Period(f64),
    #[error("non-finite orbital element: {0}")]
    NonFinite(&'static str),
}

/// Maps orbital elements and a systemic velocity to predicted velocities.
///
/// Implementations must be pure: the same inputs always give the same output,
/// of the same length as `times`. `Sync` lets the sampler evaluate walkers on
/// several threads against one shared model.
pub trait OrbitModel: Sync {
    fn radial_velocities(
        &self,
        elements: &OrbitalElements,
        vz: f64,
        times: &[f64],
    ) -> Result<Vec<f64>, OrbitError>;
}

/// Keplerian two-body RV curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeplerOrbit;

impl KeplerOrbit {
    fn validate(elements: &OrbitalElements, vz: f64) -> Result<(f64, f64, f64), OrbitError> {
        let checks = [
            (elements.log_k, "log10_k"),
            (elements.log_period, "log10_period"),
            (elements.t0, "t0"),
            (elements.w, "w"),
            (elements.log_e, "log10_e"),
            (vz, "vz"),
        ];
        if let Some((_, name)) = checks.iter().find(|(v, _)| !v.is_finite()) {
            return Err(OrbitError::NonFinite(*name));
        }
        let period = elements.period();
        if !(period.is_finite() && period > 0.0) {
            return Err(OrbitError::Period(period));
        }
        let e = elements.eccentricity();
        if !(0.0..1.0).contains(&e) {
            return Err(OrbitError::Eccentricity(e));
        }
        Ok((elements.semi_amplitude(), period, e))
    }
}

impl OrbitModel for KeplerOrbit {
    fn radial_velocities(
        &self,
        elements: &OrbitalElements,
        vz: f64,
        times: &[f64],
    ) -> Result<Vec<f64>, OrbitError> {
        let (k, period, e) = Self::validate(elements, vz)?;
        let w = elements.w.to_radians();
        let e_cos_w = e * w.cos();

        Ok(times
            .iter()
            .map(|&t| {
                let m = mean_anomaly(t, elements.t0, period);
                let nu = true_anomaly(eccentric_anomaly(m, e), e);
                vz + k * ((nu + w).cos() + e_cos_w)
            })
            .collect())
    }
}
