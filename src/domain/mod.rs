//! Domain types used throughout the estimator.
//!
//! This module defines:
//!
//! - the θ layout (`ParamLayout`, `OrbitalElements`)
//! - bounds (`Bound`, `OrbitBounds`, `VzBounds`)
//! - validated observation arrays (`Dataset`)
//! - driver settings (`MlOptions`, `McmcOptions`)

pub mod dataset;
pub mod types;

pub use dataset::*;
pub use types::*;
