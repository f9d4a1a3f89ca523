//! Forward and inverse calibration walkthrough
//!
//! Loads the three standard trace dumps from a directory (first argument)
//! and prints 5/50/95 percentile bands as JSON. Without an argument a small
//! synthetic pooled trace is used.
//!
//! Run with: RUST_LOG=bayfox=debug cargo run --example calibrate -- <trace-dir>

use anyhow::Context;
use bayfox::trace::{PooledTrace, TraceTable};
use bayfox::{
    predict_d18oc, predict_seatemp, DrawDispenser, Interpolation, PredictOptions, SeatempPrior,
    SeawaterD18O,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn synthetic_dispenser() -> anyhow::Result<DrawDispenser> {
    let table = TraceTable::from_columns([
        ("a", vec![3.28, 3.31, 3.35, 3.30]),
        ("b", vec![-0.223, -0.221, -0.226, -0.224]),
        ("tau", vec![0.54, 0.56, 0.55, 0.53]),
    ])?;
    Ok(DrawDispenser::builder()
        .pooled_annual(PooledTrace::new(table))
        .build())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dispenser = match std::env::args().nth(1) {
        Some(dir) => DrawDispenser::from_resource_dir(&dir)
            .with_context(|| format!("loading trace dumps from {dir}"))?,
        None => synthetic_dispenser()?,
    };
    let options = PredictOptions::new();
    let mut rng = StdRng::seed_from_u64(123);

    let seatemp = [2.0, 12.0, 22.0, 28.0];
    let d18oc = predict_d18oc(
        &seatemp,
        &SeawaterD18O::Scalar(0.0),
        &options,
        &dispenser,
        &mut rng,
    )?;
    let d18oc_bands = d18oc.percentile(None, Interpolation::Nearest)?;
    println!("d18oc 5/50/95 for SST {seatemp:?}:");
    println!("{}", serde_json::to_string_pretty(&d18oc_bands)?);

    let medians: Vec<f64> = d18oc_bands.column(1).to_vec();
    let sst = predict_seatemp(
        &medians,
        &SeawaterD18O::Scalar(0.0),
        SeatempPrior::new(15.0, 10.0),
        &options,
        &dispenser,
        &mut rng,
    )?;
    println!("SST 5/50/95 recovered from median d18oc:");
    println!(
        "{}",
        serde_json::to_string_pretty(&sst.percentile(None, Interpolation::Nearest)?)?
    );

    Ok(())
}
