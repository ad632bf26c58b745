//! Timing demo - instrumented toy optimizer
//!
//! Runs a few steps of gradient descent on a least-squares problem held in a
//! `VectorConfig`, timing each phase, and prints both timing reports.
//!
//! Usage: `timing-demo [ITERATIONS]`
//!
//! Set `TIMING_CONFIG` to a JSON file to override the timing config, and
//! `RUST_LOG` to control log output.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use timing::{gttic, gttic_, gttoc, TimingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vector_config::VectorConfig;

const DEFAULT_ITERATIONS: usize = 20;
const STEP_SIZE: f64 = 0.25;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let iterations = match env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid iteration count {arg:?}"))?,
        None => DEFAULT_ITERATIONS,
    };

    timing::configure(load_config()?);
    tracing::info!(iterations, "Starting timing demo");

    let targets = VectorConfig::new()
        .with("pose", vec![1.0, -2.0, 0.5])
        .with("landmark", vec![4.0, 4.0])
        .with("bias", vec![0.1]);
    let mut estimate = targets.scale(0.0);

    for iteration in 0..iterations {
        estimate = optimize_step(&estimate, &targets)?;
        timing::finish_iteration();

        let error = residual(&estimate, &targets)?;
        tracing::debug!(iteration, error, "iteration finished");
    }

    gttic_!(verify);
    let converged = estimate.equals(&targets, 1e-3);
    gttoc!(verify);
    tracing::info!(converged, "optimization finished");

    timing::print()?;
    timing::print_mean_std_dev()?;
    Ok(())
}

fn load_config() -> Result<TimingConfig> {
    let Ok(path) = env::var("TIMING_CONFIG") else {
        return Ok(TimingConfig::default());
    };
    let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = TimingConfig::from_json(&json).with_context(|| format!("parsing {path}"))?;
    tracing::info!(path = %path, "loaded timing config");
    Ok(config)
}

/// One gradient step on `0.5 * |estimate - targets|^2`.
fn optimize_step(estimate: &VectorConfig, targets: &VectorConfig) -> Result<VectorConfig> {
    gttic!(optimize_step);

    gttic!(linearize);
    let gradient = estimate.try_sub(targets)?;
    gttoc!(linearize);

    gttic!(solve);
    let delta = gradient.scale(-STEP_SIZE);
    let flat: Vec<f64> = delta.iter().flat_map(|(_, value)| value.iter().copied()).collect();
    gttoc!(solve);

    gttic!(retract);
    let updated = estimate.exmap_vector(&flat)?;
    gttoc!(retract);

    Ok(updated)
}

fn residual(estimate: &VectorConfig, targets: &VectorConfig) -> Result<f64> {
    gttic!(residual);
    let diff = estimate.try_sub(targets)?;
    Ok(diff.dot(&diff)?.sqrt())
}
