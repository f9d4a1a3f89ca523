//! Forward model: calcite δ18O from sea temperature and seawater δ18O.

use super::{check_tau, PredictOptions, Prediction, SeawaterD18O};
use crate::dispenser::DrawDispenser;
use crate::{Error, Result};
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Predict δ18O of foraminiferal calcite (‰, VPDB).
///
/// For draw `i` and observation `j`:
/// `y[j, i] ~ Normal(alpha_i + seatemp_j * beta_i + d18osw_j - 0.27, tau_i)`.
///
/// # Arguments
///
/// * `seatemp` - Sea-surface temperatures (°C), length `N`
/// * `d18osw` - Seawater δ18O (‰, VSMOW), scalar or length `N`
/// * `options` - Calibration selection (group, seasonal)
/// * `dispenser` - Source of calibration draws
/// * `rng` - Random source; seed it for reproducible ensembles
///
/// # Errors
///
/// Returns error if `d18osw` cannot broadcast to `N`, the draws cannot be
/// dispensed, or a draw has non-positive `tau`.
///
/// # Example
///
/// ```rust
/// use bayfox::dispenser::DrawDispenser;
/// use bayfox::predict::{predict_d18oc, PredictOptions, SeawaterD18O};
/// use bayfox::trace::{PooledTrace, TraceTable};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// # fn main() -> bayfox::Result<()> {
/// let table = TraceTable::from_columns([
///     ("a", vec![3.3, 3.2]),
///     ("b", vec![-0.22, -0.21]),
///     ("tau", vec![0.5, 0.6]),
/// ])?;
/// let dispenser = DrawDispenser::builder().pooled_annual(PooledTrace::new(table)).build();
///
/// let mut rng = StdRng::seed_from_u64(123);
/// let prediction = predict_d18oc(
///     &[15.0, 20.0, 25.0],
///     &SeawaterD18O::Scalar(0.5),
///     &PredictOptions::new(),
///     &dispenser,
///     &mut rng,
/// )?;
/// assert_eq!(prediction.ensemble().dim(), (3, 2));
/// # Ok(())
/// # }
/// ```
pub fn predict_d18oc<R: Rng + ?Sized>(
    seatemp: &[f64],
    d18osw: &SeawaterD18O,
    options: &PredictOptions,
    dispenser: &DrawDispenser,
    rng: &mut R,
) -> Result<Prediction> {
    let n_obs = seatemp.len();
    let d18osw_adj = d18osw.to_vpdb(n_obs)?;

    let draws = dispenser.draws(options.group_key(), options.is_seasonal())?;
    for (i, &tau) in draws.tau.iter().enumerate() {
        check_tau(i, tau)?;
    }
    debug!(observations = n_obs, draws = draws.len(), "forward model");

    let mut ensemble = Array2::<f64>::zeros((n_obs, draws.len()));
    for (i, (alpha, beta, tau)) in draws.iter().enumerate() {
        for (j, (&temp, &sw)) in seatemp.iter().zip(&d18osw_adj).enumerate() {
            let mu = alpha + temp * beta + sw;
            let normal = Normal::new(mu, tau)
                .map_err(|e| Error::InvalidParameter(format!("draw {i}: {e}")))?;
            ensemble[[j, i]] = normal.sample(rng);
        }
    }

    Ok(Prediction::new(ensemble))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{HierarchicalTrace, PooledTrace, TraceTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::StandardNormal;

    fn dispenser(tau: f64) -> DrawDispenser {
        DrawDispenser::builder()
            .pooled_annual(PooledTrace::new(
                TraceTable::from_columns([("a", vec![1.0]), ("b", vec![2.0]), ("tau", vec![tau])])
                    .unwrap(),
            ))
            .hierarchical_seasonal(HierarchicalTrace::new(
                TraceTable::from_columns([
                    ("a__1", vec![1.0, 2.0]),
                    ("b__1", vec![2.0, 2.0]),
                    ("tau__1", vec![3.0, 3.0]),
                ])
                .unwrap(),
            ))
            .build()
    }

    #[test]
    fn test_pooled_sample_matches_reference() {
        let mut rng = StdRng::seed_from_u64(123);
        let prediction = predict_d18oc(
            &[15.0],
            &SeawaterD18O::Series(vec![0.0]),
            &PredictOptions::new(),
            &dispenser(3.0),
            &mut rng,
        )
        .unwrap();

        let mut reference = StdRng::seed_from_u64(123);
        let z: f64 = reference.sample(StandardNormal);
        let mean: f64 = 1.0 + 15.0 * 2.0 + (0.0 - 0.27);
        assert!((mean - 30.73).abs() < 1e-12);
        assert_eq!(prediction.ensemble()[[0, 0]], mean + 3.0 * z);
    }

    #[test]
    fn test_mean_with_negligible_tau() {
        let mut rng = StdRng::seed_from_u64(7);
        let prediction = predict_d18oc(
            &[15.0],
            &SeawaterD18O::Scalar(0.0),
            &PredictOptions::new(),
            &dispenser(1e-12),
            &mut rng,
        )
        .unwrap();
        assert!((prediction.ensemble()[[0, 0]] - 30.73).abs() < 1e-9);
    }

    #[test]
    fn test_hierarchical_shape_and_order() {
        let mut rng = StdRng::seed_from_u64(123);
        let prediction = predict_d18oc(
            &[15.0, 0.0],
            &SeawaterD18O::Series(vec![0.0, 1.0]),
            &PredictOptions::new().group("1").seasonal(true),
            &dispenser(3.0),
            &mut rng,
        )
        .unwrap();
        assert_eq!(prediction.ensemble().dim(), (2, 2));

        // Draw-major sampling order: column 0 rows 0..N, then column 1
        let mut reference = StdRng::seed_from_u64(123);
        let z: Vec<f64> = (0..4).map(|_| reference.sample(StandardNormal)).collect();
        let ens = prediction.ensemble();
        assert_eq!(ens[[0, 0]], (1.0 + 15.0 * 2.0 - 0.27) + 3.0 * z[0]);
        assert_eq!(ens[[1, 0]], (1.0 + 0.0 * 2.0 + (1.0 - 0.27)) + 3.0 * z[1]);
        assert_eq!(ens[[0, 1]], (2.0 + 15.0 * 2.0 - 0.27) + 3.0 * z[2]);
        assert_eq!(ens[[1, 1]], (2.0 + 0.0 * 2.0 + (1.0 - 0.27)) + 3.0 * z[3]);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            predict_d18oc(
                &[10.0, 12.0, 14.0],
                &SeawaterD18O::Scalar(0.3),
                &PredictOptions::new().group("1").seasonal(true),
                &dispenser(3.0),
                &mut rng,
            )
            .unwrap()
        };
        assert_eq!(run().ensemble(), run().ensemble());
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = predict_d18oc(
            &[15.0, 0.0, 3.0],
            &SeawaterD18O::Series(vec![0.0, 1.0]),
            &PredictOptions::new(),
            &dispenser(3.0),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_non_positive_tau_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = predict_d18oc(
            &[15.0],
            &SeawaterD18O::Scalar(0.0),
            &PredictOptions::new(),
            &dispenser(0.0),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_observations() {
        let mut rng = StdRng::seed_from_u64(0);
        let prediction = predict_d18oc(
            &[],
            &SeawaterD18O::Scalar(0.0),
            &PredictOptions::new(),
            &dispenser(3.0),
            &mut rng,
        )
        .unwrap();
        assert_eq!(prediction.ensemble().dim(), (0, 1));
    }
}
