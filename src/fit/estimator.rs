//! Estimator construction.
//!
//! [`OrbitalParams`] bundles everything the evaluators need: the datasets, the
//! initial guess, the θ-aligned bounds and the orbit model. It is built once,
//! validated up front, and then only read.

use crate::domain::{build_bounds, Bound, Dataset, OrbitBounds, ParamLayout, VzBounds};
use crate::error::EstimateError;
use crate::models::{KeplerOrbit, OrbitModel};

#[derive(Debug, Clone)]
pub struct OrbitalParams<M = KeplerOrbit> {
    pub(crate) datasets: Vec<Dataset>,
    pub(crate) guess: Vec<f64>,
    pub(crate) bounds: Vec<Bound>,
    pub(crate) layout: ParamLayout,
    pub(crate) model: M,
}

impl OrbitalParams<KeplerOrbit> {
    /// Build an estimator using the Keplerian RV model.
    ///
    /// # Errors
    /// [`EstimateError::Configuration`] when `guess.len() != 5 + n_datasets`,
    /// when the number of datasets differs from `n_datasets`, or when
    /// `bounds_vz` does not match the dataset count.
    pub fn new(
        datasets: Vec<Dataset>,
        guess: Vec<f64>,
        bounds_vz: VzBounds,
        bounds: OrbitBounds,
        n_datasets: usize,
    ) -> Result<Self, EstimateError> {
        Self::with_model(KeplerOrbit, datasets, guess, bounds_vz, bounds, n_datasets)
    }
}

impl<M: OrbitModel> OrbitalParams<M> {
    /// Same as [`OrbitalParams::new`] with a caller-supplied orbit model.
    pub fn with_model(
        model: M,
        datasets: Vec<Dataset>,
        guess: Vec<f64>,
        bounds_vz: VzBounds,
        bounds: OrbitBounds,
        n_datasets: usize,
    ) -> Result<Self, EstimateError> {
        let layout = ParamLayout::new(n_datasets);
        if guess.len() != layout.dim() {
            return Err(EstimateError::config(format!(
                "guess must have a length equal to 5 + n_datasets = {}, got {}",
                layout.dim(),
                guess.len()
            )));
        }
        if datasets.len() != n_datasets {
            return Err(EstimateError::config(format!(
                "n_datasets={n_datasets} but {} datasets were supplied",
                datasets.len()
            )));
        }
        let bounds = build_bounds(&bounds, &bounds_vz, n_datasets)?;

        Ok(Self {
            datasets,
            guess,
            bounds,
            layout,
            model,
        })
    }

    pub fn n_datasets(&self) -> usize {
        self.layout.n_datasets()
    }

    pub fn ndim(&self) -> usize {
        self.layout.dim()
    }

    pub fn layout(&self) -> ParamLayout {
        self.layout
    }

    pub fn guess(&self) -> &[f64] {
        &self.guess
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![1.0, 2.0], vec![0.1, -0.1], vec![0.01, 0.01]).unwrap()
    }

    fn vz_for(n: usize) -> VzBounds {
        if n == 1 {
            VzBounds::Single(Bound::new(-1.0, 1.0))
        } else {
            VzBounds::PerDataset(vec![Bound::new(-1.0, 1.0); n])
        }
    }

    #[test]
    fn guess_length_must_match_layout() {
        for &d in &[0usize, 1, 2, 5] {
            let datasets = vec![dataset(); d];
            for wrong in [4 + d, 6 + d, 0] {
                let err = OrbitalParams::new(
                    datasets.clone(),
                    vec![0.0; wrong],
                    vz_for(d),
                    OrbitBounds::default(),
                    d,
                )
                .unwrap_err();
                assert!(matches!(err, EstimateError::Configuration(_)), "d={d} len={wrong}");
            }
            let ok = OrbitalParams::new(datasets, vec![0.0; 5 + d], vz_for(d), OrbitBounds::default(), d)
                .unwrap();
            assert_eq!(ok.ndim(), 5 + d);
            assert_eq!(ok.bounds().len(), 5 + d);
        }
    }

    #[test]
    fn dataset_count_must_match() {
        let err = OrbitalParams::new(
            vec![dataset()],
            vec![0.0; 7],
            vz_for(2),
            OrbitBounds::default(),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, EstimateError::Configuration(_)));
    }
}
