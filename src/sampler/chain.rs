//! Sampler output.
//!
//! Samples are stored walker-major: all steps of walker 0, then all steps of
//! walker 1, and so on, so `(walker, step, dim)` indexes a flat buffer.

use nalgebra::DMatrix;

use crate::error::EstimateError;

#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    n_walkers: usize,
    n_steps: usize,
    n_dim: usize,
    samples: Vec<f64>,
    log_prob: Vec<f64>,
    accepted: Vec<usize>,
}

impl Chain {
    pub(crate) fn zeros(n_walkers: usize, n_steps: usize, n_dim: usize) -> Self {
        Self {
            n_walkers,
            n_steps,
            n_dim,
            samples: vec![0.0; n_walkers * n_steps * n_dim],
            log_prob: vec![f64::NEG_INFINITY; n_walkers * n_steps],
            accepted: vec![0; n_walkers],
        }
    }

    pub(crate) fn record(&mut self, step: usize, positions: &[Vec<f64>], log_prob: &[f64]) {
        for (w, (pos, lp)) in positions.iter().zip(log_prob).enumerate() {
            let start = (w * self.n_steps + step) * self.n_dim;
            self.samples[start..start + self.n_dim].copy_from_slice(pos);
            self.log_prob[w * self.n_steps + step] = *lp;
        }
    }

    pub(crate) fn accept(&mut self, walker: usize) {
        self.accepted[walker] += 1;
    }

    /// `(n_walkers, n_steps, n_dim)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_walkers, self.n_steps, self.n_dim)
    }

    pub fn sample(&self, walker: usize, step: usize) -> &[f64] {
        let start = (walker * self.n_steps + step) * self.n_dim;
        &self.samples[start..start + self.n_dim]
    }

    pub fn log_prob(&self, walker: usize, step: usize) -> f64 {
        self.log_prob[walker * self.n_steps + step]
    }

    /// Fraction of accepted proposals per walker.
    pub fn acceptance_fraction(&self) -> Vec<f64> {
        if self.n_steps == 0 {
            return vec![0.0; self.n_walkers];
        }
        self.accepted
            .iter()
            .map(|&a| a as f64 / self.n_steps as f64)
            .collect()
    }

    /// Drop the first `burn_in` steps of every walker and stack the rest as
    /// rows, walker by walker: `n_walkers · (n_steps − burn_in)` rows of
    /// `n_dim` columns.
    pub fn flat_samples(&self, burn_in: usize) -> Result<DMatrix<f64>, EstimateError> {
        if burn_in >= self.n_steps {
            return Err(EstimateError::config(format!(
                "burn-in of {burn_in} steps leaves no samples from a chain of {} steps",
                self.n_steps
            )));
        }
        let kept = self.n_steps - burn_in;
        let rows = self.n_walkers * kept;
        Ok(DMatrix::from_fn(rows, self.n_dim, |r, c| {
            let walker = r / kept;
            let step = burn_in + r % kept;
            self.sample(walker, step)[c]
        }))
    }
}
