//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the maximum-likelihood fit or the posterior sampler
//! - prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, DataArgs, McmcArgs, MlArgs, SimulateArgs};
use crate::data::synthetic::{SyntheticConfig, generate, split_instruments};
use crate::domain::{McmcOptions, MlOptions, OrbitalElements};
use crate::error::EstimateError;
use crate::io::{write_dataset_csv, write_json, write_samples_csv};
use crate::report::{format_ml_report, format_posterior};

pub mod pipeline;

use pipeline::RunConfig;

/// Entry point for the `rvorbit` binary.
pub fn run() -> Result<(), EstimateError> {
    // A missing .env is normal.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Ml(args) => args.common.verbose,
        Command::Mcmc(args) => args.common.verbose,
        Command::Simulate(_) => false,
    };
    init_tracing(verbose);

    match cli.command {
        Command::Ml(args) => handle_ml(args),
        Command::Mcmc(args) => handle_mcmc(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Logs go to stderr so stdout stays clean for reports.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run_config(args: &DataArgs) -> Result<RunConfig, EstimateError> {
    RunConfig::new(
        args.data.clone(),
        args.guess.clone(),
        &args.bounds,
        args.bounds_vz.clone(),
    )
}

fn handle_ml(args: MlArgs) -> Result<(), EstimateError> {
    let config = run_config(&args.common)?;
    let opts = MlOptions {
        max_iter: args.max_iter,
        verbose: args.common.verbose,
    };
    let run = pipeline::run_ml(&config, &opts)?;

    println!("{}", format_ml_report(&run.names, &run.estimate, &run.residuals));

    if let Some(path) = &args.common.export_json {
        write_json(path, &run)?;
    }
    Ok(())
}

fn handle_mcmc(args: McmcArgs) -> Result<(), EstimateError> {
    let config = run_config(&args.common)?;
    let opts = McmcOptions {
        n_walkers: args.walkers,
        n_steps: args.steps,
        n_threads: args.threads,
        seed: args.seed,
    };
    let run = pipeline::run_mcmc(&config, &opts, args.burn_in)?;

    println!("{}", format_posterior(&run.summary, &run.acceptance, run.burn_in));

    if let Some(path) = &args.common.export_json {
        write_json(path, &run)?;
    }
    if let Some(path) = &args.export_samples {
        write_samples_csv(path, &run.samples, &run.sample_names())?;
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), EstimateError> {
    let elements = OrbitalElements::from_physical(args.k, args.period, args.t0, args.w, args.e);
    let config = SyntheticConfig {
        elements,
        vz: 0.0,
        n_points: args.points,
        t_start: args.t0,
        span: args.span.unwrap_or(args.period),
        rv_err: args.rv_err,
        noise: !args.noiseless,
        time_jitter: args.jitter,
        seed: args.seed,
    };
    let series = generate(&config)?;
    let parts = split_instruments(&series, &args.offsets)?;

    if parts.len() == 1 {
        write_dataset_csv(&args.out, &parts[0])?;
        println!("wrote {} points to {}", parts[0].len(), args.out.display());
        return Ok(());
    }

    let stem = args
        .out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rv".to_string());
    let ext = args
        .out
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    for (i, part) in parts.iter().enumerate() {
        let path = args.out.with_file_name(format!("{stem}_{i}.{ext}"));
        write_dataset_csv(&path, part)?;
        println!("wrote {} points to {}", part.len(), path.display());
    }
    Ok(())
}
