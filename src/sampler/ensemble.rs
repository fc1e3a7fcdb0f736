//! Affine-invariant ensemble sampler (stretch move).
//!
//! Walkers are split into two halves. Each half is updated in turn using
//! partners drawn from the other half:
//!
//! ```text
//! Y = X_k + z (X_j − X_k),   z ~ g(z) ∝ 1/√z on [1/a, a]
//! accept with probability min(1, z^(n−1) p(Y) / p(X_j))
//! ```
//!
//! Proposals of one half depend only on the other (frozen) half, so their
//! log-probabilities are evaluated in parallel on a dedicated rayon pool.
//! All random draws happen on the calling thread before each parallel batch,
//! so a seeded run is reproducible for any thread count.

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::EstimateError;
use crate::sampler::chain::Chain;

/// Default stretch scale `a`.
pub const DEFAULT_STRETCH: f64 = 2.0;

/// Log-probability target.
pub trait LogProb: Sync {
    fn log_prob(&self, theta: &[f64]) -> Result<f64, EstimateError>;
}

impl<F> LogProb for F
where
    F: Fn(&[f64]) -> Result<f64, EstimateError> + Sync,
{
    fn log_prob(&self, theta: &[f64]) -> Result<f64, EstimateError> {
        self(theta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleSampler {
    n_walkers: usize,
    n_dim: usize,
    n_threads: usize,
    stretch: f64,
}

struct Proposal {
    walker: usize,
    z: f64,
    position: Vec<f64>,
    log_u: f64,
}

impl EnsembleSampler {
    /// The ensemble must be even (two equal halves) and hold at least
    /// `2 · n_dim` walkers so the stretch move can span the space.
    pub fn new(n_walkers: usize, n_dim: usize, n_threads: usize) -> Result<Self, EstimateError> {
        if n_dim == 0 {
            return Err(EstimateError::Sampler("dimension must be > 0".into()));
        }
        if n_walkers % 2 != 0 {
            return Err(EstimateError::Sampler(format!(
                "number of walkers must be even, got {n_walkers}"
            )));
        }
        if n_walkers < 2 * n_dim {
            return Err(EstimateError::Sampler(format!(
                "need at least 2 * n_dim = {} walkers, got {n_walkers}",
                2 * n_dim
            )));
        }
        if n_threads == 0 {
            return Err(EstimateError::Sampler("thread count must be >= 1".into()));
        }
        Ok(Self {
            n_walkers,
            n_dim,
            n_threads,
            stretch: DEFAULT_STRETCH,
        })
    }

    pub fn n_walkers(&self) -> usize {
        self.n_walkers
    }

    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// Advance the ensemble `n_steps` times from `initial` and return every
    /// visited state.
    pub fn run<L, R>(
        &self,
        log_prob: &L,
        initial: Vec<Vec<f64>>,
        n_steps: usize,
        rng: &mut R,
    ) -> Result<Chain, EstimateError>
    where
        L: LogProb + ?Sized,
        R: Rng,
    {
        if initial.len() != self.n_walkers || initial.iter().any(|p| p.len() != self.n_dim) {
            return Err(EstimateError::Sampler(format!(
                "initial positions must have shape ({}, {})",
                self.n_walkers, self.n_dim
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_threads)
            .build()
            .map_err(|e| EstimateError::Sampler(format!("failed to build worker pool: {e}")))?;

        let mut positions = initial;
        let mut lp = pool.install(|| {
            positions
                .par_iter()
                .map(|p| checked_log_prob(log_prob, p))
                .collect::<Result<Vec<f64>, _>>()
        })?;

        info!(
            walkers = self.n_walkers,
            dim = self.n_dim,
            steps = n_steps,
            threads = self.n_threads,
            "running ensemble sampler"
        );

        let mut chain = Chain::zeros(self.n_walkers, n_steps, self.n_dim);
        let half = self.n_walkers / 2;
        let a = self.stretch;
        let log_exponent = (self.n_dim - 1) as f64;

        for step in 0..n_steps {
            for (active, partners) in [(0..half, half..self.n_walkers), (half..self.n_walkers, 0..half)] {
                let proposals: Vec<Proposal> = active
                    .map(|j| {
                        let z = ((a - 1.0) * rng.gen_range(0.0_f64..1.0) + 1.0).powi(2) / a;
                        let k = rng.gen_range(partners.clone());
                        let position = positions[k]
                            .iter()
                            .zip(&positions[j])
                            .map(|(xk, xj)| xk + z * (xj - xk))
                            .collect();
                        let log_u = rng.gen_range(0.0_f64..1.0).ln();
                        Proposal {
                            walker: j,
                            z,
                            position,
                            log_u,
                        }
                    })
                    .collect();

                let new_lp = pool.install(|| {
                    proposals
                        .par_iter()
                        .map(|p| checked_log_prob(log_prob, &p.position))
                        .collect::<Result<Vec<f64>, _>>()
                })?;

                for (p, lp_new) in proposals.into_iter().zip(new_lp) {
                    let log_ratio = log_exponent * p.z.ln() + lp_new - lp[p.walker];
                    if p.log_u < log_ratio {
                        positions[p.walker] = p.position;
                        lp[p.walker] = lp_new;
                        chain.accept(p.walker);
                    }
                }
            }
            chain.record(step, &positions, &lp);

            if n_steps >= 10 && (step + 1) % (n_steps / 10) == 0 {
                debug!(step = step + 1, of = n_steps, "sampler progress");
            }
        }

        let acc = chain.acceptance_fraction();
        let mean_acc = if acc.is_empty() {
            0.0
        } else {
            acc.iter().sum::<f64>() / acc.len() as f64
        };
        info!(mean_acceptance = mean_acc, "ensemble sampler finished");

        Ok(chain)
    }
}

/// `-inf` is a valid rejection; NaN and `+inf` mean the target is broken.
fn checked_log_prob<L: LogProb + ?Sized>(log_prob: &L, theta: &[f64]) -> Result<f64, EstimateError> {
    let v = log_prob.log_prob(theta)?;
    if v.is_nan() || v == f64::INFINITY {
        return Err(EstimateError::Sampler(format!(
            "log-probability returned {v} at {theta:?}"
        )));
    }
    Ok(v)
}
