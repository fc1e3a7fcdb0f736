//! Posterior sampling driver.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::domain::McmcOptions;
use crate::error::EstimateError;
use crate::fit::estimator::OrbitalParams;
use crate::models::OrbitModel;
use crate::sampler::{Chain, EnsembleSampler};

/// Standard deviation of the Gaussian ball the walkers start in.
pub const INIT_SCATTER: f64 = 1e-2;

impl<M: OrbitModel> OrbitalParams<M> {
    /// Sample `lnprob` with an affine-invariant ensemble.
    ///
    /// Walkers start at `guess + 1e-2 · N(0, 1)` per coordinate. The returned
    /// chain holds every step of every walker; burn-in is the caller's choice.
    pub fn emcee_orbit(&self, opts: &McmcOptions) -> Result<Chain, EstimateError> {
        let ndim = self.ndim();
        let sampler = EnsembleSampler::new(opts.n_walkers, ndim, opts.n_threads)?;

        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let initial = self.initial_ball(opts.n_walkers, &mut rng)?;

        let outside = initial
            .iter()
            .filter(|p| self.lnprior(p).map(|lp| lp.is_infinite()).unwrap_or(true))
            .count();
        if outside > 0 {
            info!(outside, walkers = opts.n_walkers, "walkers start outside the prior support");
        }

        let log_prob = |theta: &[f64]| self.lnprob(theta);
        sampler.run(&log_prob, initial, opts.n_steps, &mut rng)
    }

    /// `n_walkers` start positions drawn from `N(guess, INIT_SCATTER²)` per coordinate.
    pub(crate) fn initial_ball<R: Rng>(&self, n_walkers: usize, rng: &mut R) -> Result<Vec<Vec<f64>>, EstimateError> {
        let scatter = Normal::new(0.0, INIT_SCATTER)
            .map_err(|e| EstimateError::Sampler(format!("invalid initial scatter: {e}")))?;
        Ok((0..n_walkers)
            .map(|_| self.guess.iter().map(|g| g + scatter.sample(rng)).collect())
            .collect())
    }
}
