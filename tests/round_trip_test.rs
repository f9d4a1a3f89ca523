//! Statistical round trip: forward model over the inverse posterior
//!
//! Temperatures sampled from the inverse posterior, pushed back through the
//! forward model, should reproduce the observed calcite δ18O in
//! distribution. With a flat prior and a single calibration draw, the
//! reconstructed calcite has mean `d18oc` and variance `2 * tau^2`.

use bayfox::trace::{PooledTrace, TraceTable};
use bayfox::{
    predict_d18oc, predict_seatemp, DrawDispenser, PredictOptions, SeatempPrior, SeawaterD18O,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ALPHA: f64 = 3.0;
const BETA: f64 = -0.2;
const TAU: f64 = 0.1;
const N_SAMPLES: usize = 4_000;

fn pooled_dispenser(draws: usize) -> DrawDispenser {
    let table = TraceTable::from_columns([
        ("a", vec![ALPHA; draws]),
        ("b", vec![BETA; draws]),
        ("tau", vec![TAU; draws]),
    ])
    .unwrap();
    DrawDispenser::builder()
        .pooled_annual(PooledTrace::new(table))
        .build()
}

#[allow(clippy::cast_precision_loss)]
fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

#[test]
fn test_forward_over_inverse_posterior_recovers_d18oc() {
    let d18oc = -1.0;
    let d18osw = SeawaterD18O::Scalar(0.4);
    let mut rng = StdRng::seed_from_u64(31_415);

    let inverse = predict_seatemp(
        &[d18oc],
        &d18osw,
        SeatempPrior::new(15.0, 1_000.0),
        &PredictOptions::new(),
        &pooled_dispenser(N_SAMPLES),
        &mut rng,
    )
    .unwrap();
    let temperatures: Vec<f64> = inverse.ensemble().row(0).to_vec();

    let forward = predict_d18oc(
        &temperatures,
        &d18osw,
        &PredictOptions::new(),
        &pooled_dispenser(1),
        &mut rng,
    )
    .unwrap();
    let reconstructed: Vec<f64> = forward.ensemble().column(0).to_vec();

    let (mean, var) = mean_and_variance(&reconstructed);
    assert!((mean - d18oc).abs() < 0.02, "mean {mean} vs {d18oc}");
    let expected_var = 2.0 * TAU * TAU;
    assert!(
        (var - expected_var).abs() < 0.2 * expected_var,
        "variance {var} vs {expected_var}"
    );
}

#[test]
fn test_inverse_posterior_moments() {
    // Posterior for one unknown: var = 1 / (1/s^2 + b^2/tau^2)
    let d18oc = -2.5;
    let prior = SeatempPrior::new(20.0, 5.0);
    let mut rng = StdRng::seed_from_u64(2_718);

    let inverse = predict_seatemp(
        &[d18oc],
        &SeawaterD18O::Scalar(0.0),
        prior,
        &PredictOptions::new(),
        &pooled_dispenser(N_SAMPLES),
        &mut rng,
    )
    .unwrap();

    let precision = TAU.powi(-2);
    let prior_precision = prior.std.powi(-2);
    let post_var = 1.0 / (prior_precision + precision * BETA * BETA);
    let post_mean = post_var
        * (prior_precision * prior.mean
            + precision * BETA * (d18oc - (0.0 - bayfox::VSMOW_TO_VPDB) - ALPHA));

    let (mean, var) = mean_and_variance(&inverse.ensemble().row(0).to_vec());
    assert!((mean - post_mean).abs() < 0.1, "mean {mean} vs {post_mean}");
    assert!((var - post_var).abs() < 0.1 * post_var, "variance {var} vs {post_var}");
}
