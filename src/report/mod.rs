//! Reporting utilities: per-dataset residual diagnostics and terminal output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{N_ORBITAL, OrbitalElements};
use crate::error::EstimateError;
use crate::fit::OrbitalParams;
use crate::models::OrbitModel;

/// Fit quality of one dataset at a given θ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualStats {
    pub dataset: usize,
    pub n_points: usize,
    /// Root mean square of `rv − model`.
    pub rms: f64,
    /// `Σ (rv − model)² / σ²`.
    pub chi2: f64,
}

/// Residual diagnostics for every dataset at `theta`.
pub fn compute_residuals<M: OrbitModel>(
    est: &OrbitalParams<M>,
    theta: &[f64],
) -> Result<Vec<ResidualStats>, EstimateError> {
    est.layout().check(theta)?;
    let elements = OrbitalElements::from_slice(&theta[..N_ORBITAL]);

    let mut out = Vec::with_capacity(est.n_datasets());
    for (i, data) in est.datasets().iter().enumerate() {
        let vz = theta[est.layout().offset_index(i)];
        let model = est.model().radial_velocities(&elements, vz, data.t())?;

        let mut sq = 0.0;
        let mut chi2 = 0.0;
        for ((y, m), s) in data.rv().iter().zip(&model).zip(data.rv_err()) {
            let r = y - m;
            sq += r * r;
            chi2 += (r / s).powi(2);
        }
        let n = data.len();
        let rms = if n > 0 { (sq / n as f64).sqrt() } else { 0.0 };
        out.push(ResidualStats {
            dataset: i,
            n_points: n,
            rms,
            chi2,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{SyntheticConfig, generate, split_instruments};
    use crate::domain::{Bound, OrbitBounds, VzBounds};

    #[test]
    fn residuals_vanish_at_truth_and_grow_off_it() {
        let el = OrbitalElements::from_physical(58.1e-3, 2.98565, 1497.5, 11.0, 0.213);
        let base = generate(&SyntheticConfig {
            elements: el,
            vz: 0.0,
            n_points: 50,
            t_start: 1497.5,
            span: el.period(),
            rv_err: 0.01,
            noise: false,
            time_jitter: 0.0,
            seed: 0,
        })
        .unwrap();
        let parts = split_instruments(&base, &[0.0, 0.2]).unwrap();

        let mut theta = el.to_array().to_vec();
        theta.extend([0.0, 0.2]);
        let est = OrbitalParams::new(
            parts,
            theta.clone(),
            VzBounds::PerDataset(vec![Bound::new(-1.0, 1.0); 2]),
            OrbitBounds::default(),
            2,
        )
        .unwrap();

        let at_truth = compute_residuals(&est, &theta).unwrap();
        assert_eq!(at_truth.len(), 2);
        assert_eq!(at_truth[0].n_points + at_truth[1].n_points, 50);
        assert!(at_truth.iter().all(|r| r.rms < 1e-12));

        theta[6] = 0.25;
        let off = compute_residuals(&est, &theta).unwrap();
        assert!((off[1].rms - 0.05).abs() < 1e-10);
        assert!((off[1].chi2 - 25.0 * 25.0).abs() < 1e-6);
        assert!(off[0].rms < 1e-12);
    }
}
