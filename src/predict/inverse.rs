//! Inverse model: sea temperature from calcite and seawater δ18O.
//!
//! Each temperature unknown gets an independent Normal prior, so the
//! Gaussian posterior for draw `i` reduces to scalar arithmetic:
//!
//! ```text
//! precision     = tau_i^-2
//! post_inv_cov  = prior_std^-2 + precision * beta_i^2
//! post_cov      = 1 / post_inv_cov
//! post_mean     = post_cov * (prior_std^-2 * prior_mean
//!                             + precision * beta_i * (d18oc - d18osw_adj - alpha_i))
//! ```

use super::{check_tau, PredictOptions, Prediction, SeawaterD18O};
use crate::dispenser::DrawDispenser;
use crate::{Error, Result};
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Normal prior on sea-surface temperature (°C), shared by all observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatempPrior {
    /// Prior mean (°C)
    pub mean: f64,
    /// Prior standard deviation (°C), must be positive
    pub std: f64,
}

impl SeatempPrior {
    /// Create a prior
    #[must_use]
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Prior precision (`std^-2`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] unless `std` is finite and
    /// positive with a finite `std^-2`, and `mean` is finite.
    pub fn precision(&self) -> Result<f64> {
        if !(self.std.is_finite() && self.std > 0.0) {
            warn!(prior_std = self.std, "rejected prior");
            return Err(Error::InvalidParameter(format!(
                "prior_std must be finite and positive, got {}",
                self.std
            )));
        }
        if !self.mean.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "prior_mean must be finite, got {}",
                self.mean
            )));
        }
        let precision = self.std.powi(-2);
        if !precision.is_finite() {
            warn!(prior_std = self.std, "prior precision overflows");
            return Err(Error::InvalidParameter(format!(
                "prior_std {} is too small: precision is not finite",
                self.std
            )));
        }
        Ok(precision)
    }
}

/// Posterior mean and variance of one temperature unknown for one draw.
fn posterior(
    prior_mean: f64,
    prior_precision: f64,
    precision: f64,
    beta: f64,
    residual: f64,
) -> (f64, f64) {
    let post_inv_cov = prior_precision + precision * beta.powi(2);
    let post_cov = 1.0 / post_inv_cov;
    let mean_first_factor = prior_precision * prior_mean + precision * beta * residual;
    (post_cov * mean_first_factor, post_cov)
}

/// Predict sea-surface temperature (°C) from calcite δ18O.
///
/// # Arguments
///
/// * `d18oc` - Calcite δ18O (‰, VPDB), length `N`
/// * `d18osw` - Seawater δ18O (‰, VSMOW), scalar or length `N`
/// * `prior` - Temperature prior applied independently to every observation
/// * `options` - Calibration selection (group, seasonal)
/// * `dispenser` - Source of calibration draws
/// * `rng` - Random source; seed it for reproducible ensembles
///
/// # Errors
///
/// Returns error if `d18osw` cannot broadcast to `N`, the prior is
/// degenerate, the draws cannot be dispensed, a draw has non-positive
/// `tau`, or a precision or posterior moment is not finite. Parameter
/// checks run before any sampling.
pub fn predict_seatemp<R: Rng + ?Sized>(
    d18oc: &[f64],
    d18osw: &SeawaterD18O,
    prior: SeatempPrior,
    options: &PredictOptions,
    dispenser: &DrawDispenser,
    rng: &mut R,
) -> Result<Prediction> {
    let n_obs = d18oc.len();
    let d18osw_adj = d18osw.to_vpdb(n_obs)?;
    let prior_precision = prior.precision()?;

    let draws = dispenser.draws(options.group_key(), options.is_seasonal())?;
    let mut precisions = Vec::with_capacity(draws.len());
    for (i, &tau) in draws.tau.iter().enumerate() {
        check_tau(i, tau)?;
        let precision = tau.powi(-2);
        if !precision.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "tau {tau} at draw {i} is too small: precision is not finite"
            )));
        }
        precisions.push(precision);
    }
    debug!(
        observations = n_obs,
        draws = draws.len(),
        prior_mean = prior.mean,
        prior_std = prior.std,
        "inverse model"
    );

    // Posterior moments are validated for every cell before any sampling.
    let mut ensemble = Array2::<f64>::zeros((n_obs, draws.len()));
    let mut scales = Array2::<f64>::zeros((n_obs, draws.len()));
    for (i, ((alpha, beta, _), &precision)) in draws.iter().zip(&precisions).enumerate() {
        for (j, (&calcite, &sw)) in d18oc.iter().zip(&d18osw_adj).enumerate() {
            let (mean, var) = posterior(
                prior.mean,
                prior_precision,
                precision,
                beta,
                calcite - sw - alpha,
            );
            if !(mean.is_finite() && var.is_finite()) {
                return Err(Error::InvalidParameter(format!(
                    "non-finite posterior at observation {j}, draw {i}: mean {mean}, variance {var}"
                )));
            }
            ensemble[[j, i]] = mean;
            scales[[j, i]] = var.sqrt();
        }
    }

    for i in 0..draws.len() {
        for j in 0..n_obs {
            let normal = Normal::new(ensemble[[j, i]], scales[[j, i]])
                .map_err(|e| Error::InvalidParameter(format!("draw {i}: {e}")))?;
            ensemble[[j, i]] = normal.sample(rng);
        }
    }

    Ok(Prediction::new(ensemble))
}
