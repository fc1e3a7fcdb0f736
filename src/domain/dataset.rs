//! Radial-velocity datasets.
//!
//! A dataset is one measurement campaign (typically one instrument) with its
//! own zero point and noise level. Datasets are validated once on construction
//! and never mutated afterwards, so evaluators can share them across threads.

use serde::Serialize;

use crate::error::EstimateError;

/// Aligned observation arrays for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    t: Vec<f64>,
    rv: Vec<f64>,
    rv_err: Vec<f64>,
}

impl Dataset {
    /// Validate and wrap observation arrays.
    ///
    /// All three arrays must have the same length, contain only finite values,
    /// and every uncertainty must be strictly positive.
    pub fn new(t: Vec<f64>, rv: Vec<f64>, rv_err: Vec<f64>) -> Result<Self, EstimateError> {
        if t.len() != rv.len() || t.len() != rv_err.len() {
            return Err(EstimateError::config(format!(
                "dataset arrays must have equal length (t={}, rv={}, rv_err={})",
                t.len(),
                rv.len(),
                rv_err.len()
            )));
        }
        if let Some(k) = t.iter().chain(&rv).position(|v| !v.is_finite()) {
            return Err(EstimateError::config(format!(
                "non-finite time or velocity at flat index {k}"
            )));
        }
        if let Some((k, s)) = rv_err
            .iter()
            .enumerate()
            .find(|(_, s)| !(s.is_finite() && **s > 0.0))
        {
            return Err(EstimateError::config(format!(
                "rv_err[{k}] = {s} must be finite and > 0"
            )));
        }
        Ok(Self { t, rv, rv_err })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn t(&self) -> &[f64] {
        &self.t
    }

    pub fn rv(&self) -> &[f64] {
        &self.rv
    }

    pub fn rv_err(&self) -> &[f64] {
        &self.rv_err
    }

    /// Split at `mid` into two datasets (e.g. to emulate two instruments).
    pub fn split_at(&self, mid: usize) -> Result<(Dataset, Dataset), EstimateError> {
        if mid > self.len() {
            return Err(EstimateError::config(format!(
                "split index {mid} beyond dataset length {}",
                self.len()
            )));
        }
        let left = Dataset {
            t: self.t[..mid].to_vec(),
            rv: self.rv[..mid].to_vec(),
            rv_err: self.rv_err[..mid].to_vec(),
        };
        let right = Dataset {
            t: self.t[mid..].to_vec(),
            rv: self.rv[mid..].to_vec(),
            rv_err: self.rv_err[mid..].to_vec(),
        };
        Ok((left, right))
    }

    /// Return a copy with `delta` added to every velocity.
    pub fn shifted(&self, delta: f64) -> Dataset {
        Dataset {
            t: self.t.clone(),
            rv: self.rv.iter().map(|v| v + delta).collect(),
            rv_err: self.rv_err.clone(),
        }
    }
}
