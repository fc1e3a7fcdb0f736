//! Orbit model implementations.
//!
//! Models are pure functions of the elements so the likelihood code can stay
//! generic over them.

pub mod orbit;

pub use orbit::*;
