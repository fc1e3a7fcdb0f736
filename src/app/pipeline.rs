//! Shared run logic for the `ml` and `mcmc` commands.
//!
//! Load datasets -> build the estimator -> run the driver -> collect what the
//! front-end prints or exports. Presentation stays in `app`/`report`.

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::Serialize;
use tracing::info;

use crate::domain::{Bound, McmcOptions, MlOptions, N_ORBITAL, OrbitBounds, ParamLayout, VzBounds};
use crate::error::EstimateError;
use crate::fit::{MlEstimate, OrbitalParams};
use crate::io::load_dataset;
use crate::report::{ResidualStats, compute_residuals};
use crate::summary::{ParamSummary, physical_names, summarize_samples};

/// Offset bounds used for every dataset when none are given.
pub const DEFAULT_VZ_BOUND: Bound = Bound::new(-1.0, 1.0);

/// Resolved inputs of one estimation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_paths: Vec<PathBuf>,
    pub guess: Vec<f64>,
    pub orbit_bounds: OrbitBounds,
    /// Empty means [`DEFAULT_VZ_BOUND`] for every dataset.
    pub vz_bounds: Vec<Bound>,
}

impl RunConfig {
    pub fn new(
        data_paths: Vec<PathBuf>,
        guess: Vec<f64>,
        bounds: &[Bound],
        vz_bounds: Vec<Bound>,
    ) -> Result<Self, EstimateError> {
        let orbit_bounds = match bounds.len() {
            0 => OrbitBounds::default(),
            N_ORBITAL => OrbitBounds([bounds[0], bounds[1], bounds[2], bounds[3], bounds[4]]),
            n => {
                return Err(EstimateError::config(format!(
                    "expected {N_ORBITAL} orbital bounds, got {n}"
                )));
            }
        };
        Ok(Self {
            data_paths,
            guess,
            orbit_bounds,
            vz_bounds,
        })
    }

    fn vz(&self) -> VzBounds {
        let n = self.data_paths.len();
        match (self.vz_bounds.as_slice(), n) {
            ([], 1) => VzBounds::Single(DEFAULT_VZ_BOUND),
            ([], _) => VzBounds::PerDataset(vec![DEFAULT_VZ_BOUND; n]),
            ([single], 1) => VzBounds::Single(*single),
            (list, _) => VzBounds::PerDataset(list.to_vec()),
        }
    }
}

/// Load every dataset and build the estimator.
pub fn build_estimator(config: &RunConfig) -> Result<OrbitalParams, EstimateError> {
    let mut datasets = Vec::with_capacity(config.data_paths.len());
    for path in &config.data_paths {
        let ingested = load_dataset(path)?;
        info!(
            file = %path.display(),
            rows_used = ingested.rows_used,
            rows_read = ingested.rows_read,
            "loaded dataset"
        );
        datasets.push(ingested.dataset);
    }
    let n = datasets.len();
    OrbitalParams::new(
        datasets,
        config.guess.clone(),
        config.vz(),
        config.orbit_bounds,
        n,
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct MlRun {
    pub names: Vec<String>,
    pub estimate: MlEstimate,
    pub residuals: Vec<ResidualStats>,
}

pub fn run_ml(config: &RunConfig, opts: &MlOptions) -> Result<MlRun, EstimateError> {
    let est = build_estimator(config)?;
    let estimate = est.ml_orbit(opts)?;
    let residuals = compute_residuals(&est, &estimate.theta)?;
    Ok(MlRun {
        names: est.layout().names(),
        estimate,
        residuals,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct McmcRun {
    pub summary: Vec<ParamSummary>,
    pub acceptance: Vec<f64>,
    pub burn_in: usize,
    #[serde(skip)]
    pub samples: DMatrix<f64>,
    #[serde(skip)]
    pub layout: ParamLayout,
}

impl McmcRun {
    /// Column names for exported samples (θ coordinates, log10 where stored so).
    pub fn sample_names(&self) -> Vec<String> {
        self.layout.names()
    }
}

pub fn run_mcmc(config: &RunConfig, opts: &McmcOptions, burn_in: usize) -> Result<McmcRun, EstimateError> {
    let est = build_estimator(config)?;
    let chain = est.emcee_orbit(opts)?;
    let layout = est.layout();
    let samples = chain.flat_samples(burn_in)?;
    let summary = summarize_samples(&samples, &layout)?;
    info!(params = ?physical_names(&layout), "posterior summarized");
    Ok(McmcRun {
        summary,
        acceptance: chain.acceptance_fraction(),
        burn_in,
        samples,
        layout,
    })
}
