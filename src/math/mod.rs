//! Mathematical utilities: Kepler's equation and order statistics.

pub mod kepler;
pub mod stats;

pub use kepler::*;
pub use stats::*;
