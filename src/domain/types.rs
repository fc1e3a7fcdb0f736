//! Parameter layout, bounds and run configuration.
//!
//! The flat parameter vector θ used by every evaluator, the optimizer and the
//! sampler is laid out as:
//!
//! ```text
//! [ log10(K), log10(P), t0, ω[deg], log10(e), vz_0, vz_1, ..., vz_{D-1} ]
//! ```
//!
//! Only [`ParamLayout`] knows how many offsets follow the five orbital slots.
//! Everything else converts through [`ParamLayout::pack`] / [`ParamLayout::unpack`].

use serde::Serialize;

use crate::error::EstimateError;

/// Number of shared orbital parameters at the head of θ.
pub const N_ORBITAL: usize = 5;

/// Display names for θ positions 0..5.
pub const ORBITAL_NAMES: [&str; N_ORBITAL] = ["log10_k", "log10_period", "t0", "w", "log10_e"];

/// Positions of θ stored as base-10 logarithms.
pub const LOG10_POSITIONS: [usize; 3] = [0, 1, 4];

/// Keplerian elements in the estimator's native parameterization.
///
/// `t0` is the epoch of periastron (same time unit as the observations),
/// `w` the argument of periastron in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitalElements {
    pub log_k: f64,
    pub log_period: f64,
    pub t0: f64,
    pub w: f64,
    pub log_e: f64,
}

impl OrbitalElements {
    /// Build elements from linear-space values.
    pub fn from_physical(k: f64, period: f64, t0: f64, w: f64, e: f64) -> Self {
        Self {
            log_k: k.log10(),
            log_period: period.log10(),
            t0,
            w,
            log_e: e.log10(),
        }
    }

    pub fn semi_amplitude(&self) -> f64 {
        10f64.powf(self.log_k)
    }

    pub fn period(&self) -> f64 {
        10f64.powf(self.log_period)
    }

    pub fn eccentricity(&self) -> f64 {
        10f64.powf(self.log_e)
    }

    pub fn to_array(&self) -> [f64; N_ORBITAL] {
        [self.log_k, self.log_period, self.t0, self.w, self.log_e]
    }

    pub fn from_slice(head: &[f64]) -> Self {
        Self {
            log_k: head[0],
            log_period: head[1],
            t0: head[2],
            w: head[3],
            log_e: head[4],
        }
    }
}

/// Open interval `(low, high)` for one θ position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Strict containment: values sitting exactly on an edge are rejected.
    pub fn contains(&self, value: f64) -> bool {
        self.low < value && value < self.high
    }
}

impl From<(f64, f64)> for Bound {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

/// Bounds for the five orbital parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitBounds(pub [Bound; N_ORBITAL]);

impl Default for OrbitBounds {
    /// log10K ∈ (−4, 4), log10P ∈ (−4, 4), t0 ∈ (0, 10000), ω ∈ (0, 360),
    /// log10e ∈ (−4, −4.3e−5).
    fn default() -> Self {
        Self([
            Bound::new(-4.0, 4.0),
            Bound::new(-4.0, 4.0),
            Bound::new(0.0, 10_000.0),
            Bound::new(0.0, 360.0),
            Bound::new(-4.0, -4.3e-5),
        ])
    }
}

/// Offset bounds as supplied by the caller.
///
/// A single-instrument fit passes one pair; a multi-instrument fit passes one
/// pair per dataset. Both shapes are kept because callers with one dataset
/// should not have to wrap their only pair in a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VzBounds {
    Single(Bound),
    PerDataset(Vec<Bound>),
}

impl VzBounds {
    /// Expand to exactly `n_datasets` bounds.
    pub fn expand(&self, n_datasets: usize) -> Result<Vec<Bound>, EstimateError> {
        match self {
            VzBounds::Single(b) if n_datasets == 1 => Ok(vec![*b]),
            VzBounds::Single(_) => Err(EstimateError::config(format!(
                "a single vz bound only applies to one dataset, got n_datasets={n_datasets}; \
                 pass one bound per dataset"
            ))),
            VzBounds::PerDataset(list) if list.len() == n_datasets => Ok(list.clone()),
            VzBounds::PerDataset(list) => Err(EstimateError::config(format!(
                "expected {n_datasets} vz bounds (one per dataset), got {}",
                list.len()
            ))),
        }
    }
}

/// Concatenate orbital and offset bounds into the θ-aligned bound list.
pub fn build_bounds(
    orbit: &OrbitBounds,
    vz: &VzBounds,
    n_datasets: usize,
) -> Result<Vec<Bound>, EstimateError> {
    let mut out = Vec::with_capacity(N_ORBITAL + n_datasets);
    out.extend_from_slice(&orbit.0);
    out.extend(vz.expand(n_datasets)?);
    Ok(out)
}

/// Dimension bookkeeping for θ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLayout {
    n_datasets: usize,
}

impl ParamLayout {
    pub fn new(n_datasets: usize) -> Self {
        Self { n_datasets }
    }

    pub fn n_datasets(&self) -> usize {
        self.n_datasets
    }

    /// Length of θ: `5 + D`.
    pub fn dim(&self) -> usize {
        N_ORBITAL + self.n_datasets
    }

    pub fn offset_index(&self, dataset: usize) -> usize {
        N_ORBITAL + dataset
    }

    pub fn check(&self, theta: &[f64]) -> Result<(), EstimateError> {
        if theta.len() != self.dim() {
            return Err(EstimateError::config(format!(
                "parameter vector must have length 5 + n_datasets = {}, got {}",
                self.dim(),
                theta.len()
            )));
        }
        Ok(())
    }

    pub fn pack(&self, elements: &OrbitalElements, offsets: &[f64]) -> Result<Vec<f64>, EstimateError> {
        if offsets.len() != self.n_datasets {
            return Err(EstimateError::config(format!(
                "expected {} velocity offsets, got {}",
                self.n_datasets,
                offsets.len()
            )));
        }
        let mut theta = Vec::with_capacity(self.dim());
        theta.extend_from_slice(&elements.to_array());
        theta.extend_from_slice(offsets);
        Ok(theta)
    }

    pub fn unpack(&self, theta: &[f64]) -> Result<(OrbitalElements, Vec<f64>), EstimateError> {
        self.check(theta)?;
        Ok((
            OrbitalElements::from_slice(&theta[..N_ORBITAL]),
            theta[N_ORBITAL..].to_vec(),
        ))
    }

    /// Human-readable name for each θ position.
    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = ORBITAL_NAMES.iter().map(|s| s.to_string()).collect();
        out.extend((0..self.n_datasets).map(|i| format!("vz_{i}")));
        out
    }
}

/// Maximum-likelihood driver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MlOptions {
    pub max_iter: u64,
    /// Log iteration count, success flag and termination cause at info level.
    pub verbose: bool,
}

impl Default for MlOptions {
    fn default() -> Self {
        Self {
            max_iter: 200,
            verbose: false,
        }
    }
}

/// MCMC driver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McmcOptions {
    pub n_walkers: usize,
    pub n_steps: usize,
    pub n_threads: usize,
    /// `None` draws a seed from the OS.
    pub seed: Option<u64>,
}

impl Default for McmcOptions {
    fn default() -> Self {
        Self {
            n_walkers: 20,
            n_steps: 1000,
            n_threads: 1,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_single_dataset_has_six_entries() {
        let b = build_bounds(
            &OrbitBounds::default(),
            &VzBounds::Single(Bound::new(-1.0, 1.0)),
            1,
        )
        .unwrap();
        assert_eq!(b.len(), 6);
        assert_eq!(b[5], Bound::new(-1.0, 1.0));
    }

    #[test]
    fn bounds_three_datasets_has_eight_entries() {
        let vz = VzBounds::PerDataset(vec![
            Bound::new(-1.0, 1.0),
            Bound::new(-2.0, 2.0),
            Bound::new(-3.0, 3.0),
        ]);
        let b = build_bounds(&OrbitBounds::default(), &vz, 3).unwrap();
        assert_eq!(b.len(), 8);
        assert_eq!(b[7], Bound::new(-3.0, 3.0));
    }

    #[test]
    fn single_vz_bound_rejected_for_many_datasets() {
        let err = build_bounds(
            &OrbitBounds::default(),
            &VzBounds::Single(Bound::new(-1.0, 1.0)),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, EstimateError::Configuration(_)));
    }

    #[test]
    fn bound_is_open_on_both_sides() {
        let b = Bound::new(0.0, 1.0);
        assert!(b.contains(0.5));
        assert!(!b.contains(0.0));
        assert!(!b.contains(1.0));
        assert!(!b.contains(f64::NAN));
    }

    #[test]
    fn pack_unpack_roundtrip() {
        let layout = ParamLayout::new(2);
        let el = OrbitalElements::from_physical(0.0581, 2.98565, 1497.5, 11.0, 0.213);
        let theta = layout.pack(&el, &[0.1, -0.2]).unwrap();
        assert_eq!(theta.len(), 7);
        let (back, offsets) = layout.unpack(&theta).unwrap();
        assert_eq!(back, el);
        assert_eq!(offsets, vec![0.1, -0.2]);
        assert!(layout.unpack(&theta[..6]).is_err());
    }

    #[test]
    fn names_follow_layout() {
        let names = ParamLayout::new(2).names();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "log10_k");
        assert_eq!(names[6], "vz_1");
    }
}
