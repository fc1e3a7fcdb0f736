//! Posterior summaries from a sampled chain.
//!
//! The contract:
//!
//! 1. drop the first `burn_in` steps of every walker
//! 2. flatten to `n_walkers · (n_steps − burn_in)` samples
//! 3. take the 16th, 50th and 84th percentile of each parameter
//! 4. for the log10 positions (K, P, e), raise 10 to each *percentile*
//!
//! Step 4 maps the log-space quantiles to physical units. Quantiles of
//! exponentiated samples are never taken.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::domain::{LOG10_POSITIONS, ParamLayout, N_ORBITAL};
use crate::error::EstimateError;
use crate::math::percentiles;
use crate::sampler::Chain;

/// Percentiles used for the median and the 1σ-equivalent interval.
pub const SUMMARY_QUANTILES: [f64; 3] = [16.0, 50.0, 84.0];

/// Physical names for θ positions, after the log10 positions are mapped back.
const PHYSICAL_NAMES: [&str; N_ORBITAL] = ["k", "period", "t0", "w", "e"];

/// Median with asymmetric errors: the value lies in `median − minus .. median + plus`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSummary {
    pub name: String,
    pub median: f64,
    pub plus: f64,
    pub minus: f64,
}

impl ParamSummary {
    fn from_quantiles(name: String, p16: f64, p50: f64, p84: f64) -> Self {
        Self {
            name,
            median: p50,
            plus: p84 - p50,
            minus: p50 - p16,
        }
    }
}

/// Summarize `chain` after discarding `burn_in` steps per walker.
pub fn summarize(chain: &Chain, burn_in: usize, layout: &ParamLayout) -> Result<Vec<ParamSummary>, EstimateError> {
    let flat = chain.flat_samples(burn_in)?;
    summarize_samples(&flat, layout)
}

/// Summarize an already flattened sample matrix (rows = samples, columns = θ).
pub fn summarize_samples(flat: &DMatrix<f64>, layout: &ParamLayout) -> Result<Vec<ParamSummary>, EstimateError> {
    if flat.ncols() != layout.dim() {
        return Err(EstimateError::config(format!(
            "sample matrix has {} columns, layout expects {}",
            flat.ncols(),
            layout.dim()
        )));
    }

    let names = physical_names(layout);
    let mut out = Vec::with_capacity(layout.dim());
    for (j, name) in names.into_iter().enumerate() {
        let column: Vec<f64> = flat.column(j).iter().copied().collect();
        let q = percentiles(&column, &SUMMARY_QUANTILES).ok_or_else(|| {
            EstimateError::Sampler(format!("cannot take percentiles of parameter {name} (empty or NaN samples)"))
        })?;
        let (p16, p50, p84) = if LOG10_POSITIONS.contains(&j) {
            (10f64.powf(q[0]), 10f64.powf(q[1]), 10f64.powf(q[2]))
        } else {
            (q[0], q[1], q[2])
        };
        out.push(ParamSummary::from_quantiles(name, p16, p50, p84));
    }
    Ok(out)
}

/// `k, period, t0, w, e, vz_0, ...`
pub fn physical_names(layout: &ParamLayout) -> Vec<String> {
    let mut names: Vec<String> = PHYSICAL_NAMES.iter().map(|s| s.to_string()).collect();
    names.extend(layout.names().into_iter().skip(N_ORBITAL));
    names
}
