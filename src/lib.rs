//! `rv-orbits` library crate.
//!
//! Estimates the orbital parameters of a binary system from radial-velocity
//! observations: a bounded maximum-likelihood fit and ensemble MCMC sampling
//! of the posterior, over one or more datasets with per-dataset offsets.
//!
//! The binary (`rvorbit`) is a thin wrapper around this library so the
//! estimation code is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod optim;
pub mod report;
pub mod sampler;
pub mod summary;
