//! Maximum-likelihood driver.

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::MlOptions;
use crate::error::EstimateError;
use crate::fit::estimator::OrbitalParams;
use crate::models::OrbitModel;
use crate::optim::{BoundedMinimizer, NelderMeadBox};

/// Initial simplex edge for log10 K and log10 e (dex).
const LOG_STEP: f64 = 0.01;
/// Initial simplex edge for log10 P (dex).
const LOG_PERIOD_STEP: f64 = 1e-3;
/// Initial simplex edge for t0 as a fraction of the guessed period.
const T0_PERIOD_FRACTION: f64 = 0.01;
/// Initial simplex edge for ω (degrees).
const W_STEP: f64 = 1.0;
/// Initial simplex edge for an offset as a fraction of its bound width.
const VZ_WIDTH_FRACTION: f64 = 0.05;

/// Best-fit parameters and the optimizer's report.
///
/// `success == false` is a legitimate outcome (e.g. iteration cap reached);
/// `theta` is then the best point seen so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlEstimate {
    pub theta: Vec<f64>,
    pub neg_log_like: f64,
    pub n_iter: u64,
    pub n_evals: u64,
    pub success: bool,
    pub message: String,
}

impl<M: OrbitModel> OrbitalParams<M> {
    /// Minimize `−lnlike` inside the bounds, starting from the guess.
    pub fn ml_orbit(&self, opts: &MlOptions) -> Result<MlEstimate, EstimateError> {
        let minimizer = NelderMeadBox::default().with_steps(self.simplex_steps());
        self.ml_orbit_with(&minimizer, opts)
    }

    /// Starting simplex edges in θ units; the t0 edge is a fraction of the
    /// guessed period.
    pub(crate) fn simplex_steps(&self) -> Vec<f64> {
        let t0_step = T0_PERIOD_FRACTION * 10f64.powf(self.guess[1]);
        let t0_step = if t0_step.is_finite() && t0_step > 0.0 { t0_step } else { 1.0 };
        let mut steps = vec![LOG_STEP, LOG_PERIOD_STEP, t0_step, W_STEP, LOG_STEP];
        for (i, data) in self.datasets.iter().enumerate() {
            let bound = self.bounds[self.layout.offset_index(i)];
            let width = bound.high - bound.low;
            let step = if width.is_finite() {
                VZ_WIDTH_FRACTION * width
            } else {
                data.rv_err().iter().copied().fold(0.0, f64::max).max(1e-3)
            };
            steps.push(step);
        }
        steps
    }

    /// As [`OrbitalParams::ml_orbit`] with an explicit minimizer.
    pub fn ml_orbit_with<B: BoundedMinimizer + ?Sized>(
        &self,
        minimizer: &B,
        opts: &MlOptions,
    ) -> Result<MlEstimate, EstimateError> {
        if self.lnprior(&self.guess)?.is_infinite() {
            warn!("initial guess lies on or outside the bounds; starting from the nearest interior point");
        }

        let objective = |theta: &[f64]| -> Result<f64, EstimateError> { Ok(-self.lnlike(theta)?) };
        let outcome = minimizer.minimize(
            &objective,
            &self.guess,
            &self.bounds,
            opts.max_iter,
            opts.verbose,
        )?;

        if opts.verbose {
            info!(
                iterations = outcome.n_iter,
                evaluations = outcome.n_evals,
                success = outcome.success,
                cause = %outcome.message,
                "maximum-likelihood fit finished"
            );
        }

        Ok(MlEstimate {
            theta: outcome.best_x,
            neg_log_like: outcome.best_cost,
            n_iter: outcome.n_iter,
            n_evals: outcome.n_evals,
            success: outcome.success,
            message: outcome.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{SyntheticConfig, generate, split_instruments};
    use crate::domain::{Bound, OrbitBounds, OrbitalElements, VzBounds};
    use crate::optim::{MinimizeOutcome, Objective};

    fn truth() -> OrbitalElements {
        OrbitalElements::from_physical(58.1e-3, 2.98565, 1497.5, 11.0, 0.213)
    }

    fn noiseless_estimator() -> OrbitalParams {
        let cfg = SyntheticConfig {
            elements: truth(),
            vz: 0.0,
            n_points: 1000,
            t_start: 1497.5,
            span: truth().period(),
            rv_err: 0.015,
            noise: false,
            time_jitter: 0.0,
            seed: 0,
        };
        let data = generate(&cfg).unwrap();
        let mut guess = truth().to_array().to_vec();
        guess.push(0.0);
        OrbitalParams::new(
            vec![data],
            guess,
            VzBounds::Single(Bound::new(-1.0, 1.0)),
            OrbitBounds::default(),
            1,
        )
        .unwrap()
    }

    #[test]
    fn noiseless_fit_from_truth_recovers_elements() {
        let est = noiseless_estimator();
        let fit = est
            .ml_orbit(&MlOptions {
                max_iter: 2000,
                verbose: true,
            })
            .unwrap();

        let got = OrbitalElements::from_slice(&fit.theta[..5]);
        let t = truth();
        let pairs = [
            (got.semi_amplitude(), t.semi_amplitude()),
            (got.period(), t.period()),
            (got.t0, t.t0),
            (got.w, t.w),
            (got.eccentricity(), t.eccentricity()),
        ];
        for (i, (g, w)) in pairs.iter().enumerate() {
            let rel = ((g - w) / w).abs();
            assert!(rel < 1e-3, "param {i}: got {g}, want {w} (rel {rel})");
        }
        assert!(fit.n_iter > 0);
    }

    #[test]
    fn offset_guesses_off_by_a_tenth_still_recover_the_orbit() {
        let data = generate(&SyntheticConfig {
            elements: truth(),
            vz: 0.0,
            n_points: 100,
            t_start: 1494.0,
            span: 6.0,
            rv_err: 0.015,
            noise: true,
            time_jitter: 0.0,
            seed: 7,
        })
        .unwrap();
        let instruments = split_instruments(&data, &[0.1, -0.2]).unwrap();
        let mut guess = truth().to_array().to_vec();
        guess.extend([0.0, 0.0]);
        let est = OrbitalParams::new(
            instruments,
            guess,
            VzBounds::PerDataset(vec![Bound::new(-1.0, 1.0); 2]),
            OrbitBounds::default(),
            2,
        )
        .unwrap();

        let fit = est
            .ml_orbit(&MlOptions {
                max_iter: 5000,
                verbose: false,
            })
            .unwrap();

        let mut at_truth = truth().to_array().to_vec();
        at_truth.extend([0.1, -0.2]);
        let truth_lnl = est.lnlike(&at_truth).unwrap();
        assert!(-fit.neg_log_like > truth_lnl - 1.0, "fit lnL {} vs truth {truth_lnl}", -fit.neg_log_like);

        let got = OrbitalElements::from_slice(&fit.theta[..5]);
        let k_rel = (got.semi_amplitude() / truth().semi_amplitude() - 1.0).abs();
        let p_rel = (got.period() / truth().period() - 1.0).abs();
        assert!(k_rel < 0.15, "K = {}", got.semi_amplitude());
        assert!(p_rel < 0.03, "P = {}", got.period());
        assert!((fit.theta[5] - 0.1).abs() < 0.03, "vz_0 = {}", fit.theta[5]);
        assert!((fit.theta[6] + 0.2).abs() < 0.03, "vz_1 = {}", fit.theta[6]);
    }

    #[test]
    fn simplex_steps_follow_the_orbit() {
        let est = noiseless_estimator();
        let steps = est.simplex_steps();
        assert_eq!(steps.len(), est.ndim());
        assert!((steps[2] - 0.01 * truth().period()).abs() < 1e-9);
        assert!((steps[5] - 0.1).abs() < 1e-12);
    }

    struct CappedMinimizer;

    impl BoundedMinimizer for CappedMinimizer {
        fn minimize(
            &self,
            objective: &dyn Objective,
            x0: &[f64],
            _: &[Bound],
            max_iter: u64,
            _: bool,
        ) -> Result<MinimizeOutcome, EstimateError> {
            Ok(MinimizeOutcome {
                best_x: x0.to_vec(),
                best_cost: objective.cost(x0)?,
                n_iter: max_iter,
                n_evals: 1,
                success: false,
                message: "maximum number of iterations reached".into(),
            })
        }
    }

    #[test]
    fn non_convergence_is_reported_not_raised() {
        let est = noiseless_estimator();
        let fit = est
            .ml_orbit_with(&CappedMinimizer, &MlOptions { max_iter: 5, verbose: false })
            .unwrap();
        assert!(!fit.success);
        assert_eq!(fit.n_iter, 5);
        assert_eq!(fit.theta, est.guess());
        assert!((fit.neg_log_like + est.lnlike(est.guess()).unwrap()).abs() < 1e-9);
    }
}
