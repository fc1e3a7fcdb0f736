//! Command-line parsing for the orbit estimator.
//!
//! Argument parsing and command dispatch stay separate from the estimation
//! code; `app` maps these structs into plain run configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Bound;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rvorbit", version, about = "Binary-orbit radial-velocity parameter estimation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Maximum-likelihood fit from an initial guess.
    Ml(MlArgs),
    /// Sample the posterior with an ensemble MCMC and print credible intervals.
    Mcmc(McmcArgs),
    /// Write synthetic observations of a known orbit to CSV.
    Simulate(SimulateArgs),
}

/// Inputs shared by `ml` and `mcmc`.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Dataset CSV (repeat once per instrument). Columns: t, rv, rv_err.
    #[arg(short = 'd', long = "data", value_name = "CSV", required = true)]
    pub data: Vec<PathBuf>,

    /// Initial θ: log10K,log10P,t0,w,log10e,vz_0[,vz_1...].
    #[arg(
        short = 'g',
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        required = true
    )]
    pub guess: Vec<f64>,

    /// Bounds for the five orbital parameters as lo:hi pairs, comma separated.
    #[arg(long, value_delimiter = ',', value_parser = parse_bound, allow_hyphen_values = true)]
    pub bounds: Vec<Bound>,

    /// Velocity offset bounds as lo:hi, once per dataset (default -1:1 each).
    #[arg(long = "bounds-vz", value_delimiter = ',', value_parser = parse_bound, allow_hyphen_values = true)]
    pub bounds_vz: Vec<Bound>,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the result as JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct MlArgs {
    #[command(flatten)]
    pub common: DataArgs,

    /// Iteration cap for the minimizer.
    #[arg(long, default_value_t = 200)]
    pub max_iter: u64,
}

#[derive(Debug, Args, Clone)]
pub struct McmcArgs {
    #[command(flatten)]
    pub common: DataArgs,

    /// Ensemble size (even, at least twice the parameter count).
    #[arg(long, default_value_t = 20)]
    pub walkers: usize,

    /// Steps per walker.
    #[arg(long, default_value_t = 1000)]
    pub steps: usize,

    /// Worker threads for log-probability evaluation.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Steps discarded from the start of every walker before summarizing.
    #[arg(long, default_value_t = 100)]
    pub burn_in: usize,

    /// Sampler seed; omit for an OS-random seed.
    #[arg(long, env = "RV_ORBITS_SEED")]
    pub seed: Option<u64>,

    /// Write the post-burn-in samples as CSV.
    #[arg(long = "export-samples", value_name = "CSV")]
    pub export_samples: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Semi-amplitude K.
    #[arg(long, default_value_t = 58.1e-3)]
    pub k: f64,

    /// Orbital period.
    #[arg(long, default_value_t = 2.98565)]
    pub period: f64,

    /// Epoch of periastron.
    #[arg(long, default_value_t = 1497.5)]
    pub t0: f64,

    /// Argument of periastron (degrees).
    #[arg(long, default_value_t = 11.0)]
    pub w: f64,

    /// Eccentricity.
    #[arg(long, default_value_t = 0.213)]
    pub e: f64,

    /// Number of observations.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub points: usize,

    /// Time covered by the observations (default: one period).
    #[arg(long)]
    pub span: Option<f64>,

    /// Per-point uncertainty and noise scale.
    #[arg(long, default_value_t = 0.015)]
    pub rv_err: f64,

    /// Do not add measurement noise.
    #[arg(long)]
    pub noiseless: bool,

    /// Epoch jitter as a fraction of the sampling step.
    #[arg(long, default_value_t = 0.0)]
    pub jitter: f64,

    /// Velocity offset per emulated instrument; one CSV is written per value.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "0")]
    pub offsets: Vec<f64>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV. With several offsets, `_<i>` is inserted before the extension.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Parse `lo:hi` into a [`Bound`].
pub fn parse_bound(s: &str) -> Result<Bound, String> {
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| format!("expected lo:hi, got `{s}`"))?;
    let parse = |v: &str| -> Result<f64, String> {
        match v.trim() {
            "-inf" => Ok(f64::NEG_INFINITY),
            "inf" | "+inf" => Ok(f64::INFINITY),
            other => other
                .parse::<f64>()
                .map_err(|_| format!("invalid bound value `{other}`")),
        }
    };
    let bound = Bound::new(parse(lo)?, parse(hi)?);
    if !(bound.low < bound.high) {
        return Err(format!("bound `{s}` must satisfy lo < hi"));
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounds() {
        assert_eq!(parse_bound("-1:1").unwrap(), Bound::new(-1.0, 1.0));
        assert_eq!(parse_bound("-4:-4.3e-5").unwrap(), Bound::new(-4.0, -4.3e-5));
        assert_eq!(parse_bound("0:inf").unwrap().high, f64::INFINITY);
        assert!(parse_bound("1:1").is_err());
        assert!(parse_bound("1").is_err());
    }

    #[test]
    fn parses_mcmc_command() {
        let cli = Cli::try_parse_from([
            "rvorbit",
            "mcmc",
            "--data",
            "a.csv",
            "--data",
            "b.csv",
            "--guess",
            "-1.2,0.47,1497.5,11,-0.67,0,0.1",
            "--bounds-vz=-1:1,-2:2",
            "--walkers",
            "24",
            "--seed",
            "9",
        ])
        .unwrap();
        let Command::Mcmc(args) = cli.command else {
            panic!("expected mcmc");
        };
        assert_eq!(args.common.data.len(), 2);
        assert_eq!(args.common.guess.len(), 7);
        assert_eq!(args.common.guess[0], -1.2);
        assert_eq!(args.common.bounds_vz, vec![Bound::new(-1.0, 1.0), Bound::new(-2.0, 2.0)]);
        assert_eq!(args.walkers, 24);
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.burn_in, 100);
    }

    #[test]
    fn ml_defaults() {
        let cli = Cli::try_parse_from(["rvorbit", "ml", "-d", "a.csv", "-g", "0,0,1,1,-1,0"]).unwrap();
        let Command::Ml(args) = cli.command else {
            panic!("expected ml");
        };
        assert_eq!(args.max_iter, 200);
        assert!(args.common.bounds.is_empty());
        assert!(!args.common.verbose);
    }
}
