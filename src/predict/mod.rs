//! Forward and inverse prediction over MCMC calibration draws
//!
//! Both models broadcast every posterior draw against every observation,
//! producing an `N x D` ensemble (one row per observation, one column per
//! draw):
//!
//! - [`predict_d18oc`]: sea temperature and seawater δ18O to calcite δ18O
//! - [`predict_seatemp`]: calcite and seawater δ18O to sea temperature,
//!   via a conjugate Normal update per draw
//!
//! Randomness comes from the caller's RNG. Sampling walks draws in order
//! and, within a draw, observations in order, so a seeded RNG reproduces
//! ensembles bit for bit.

mod forward;
mod inverse;
mod result;

pub use forward::predict_d18oc;
pub use inverse::{predict_seatemp, SeatempPrior};
pub use result::{Interpolation, Prediction, DEFAULT_PERCENTILES};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Offset converting seawater δ18O from VSMOW to VPDB (‰)
pub const VSMOW_TO_VPDB: f64 = 0.27;

/// Seawater δ18O (‰, VSMOW): one value for all observations, or one each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeawaterD18O {
    /// Broadcast to every observation
    Scalar(f64),
    /// One value per observation; length must equal the observation count
    Series(Vec<f64>),
}

impl SeawaterD18O {
    /// Broadcast to `n` observations and convert to VPDB.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if a series is not of length `n`.
    pub fn to_vpdb(&self, n: usize) -> Result<Vec<f64>> {
        match self {
            Self::Scalar(value) => Ok(vec![value - VSMOW_TO_VPDB; n]),
            Self::Series(values) if values.len() == n => {
                Ok(values.iter().map(|value| value - VSMOW_TO_VPDB).collect())
            }
            Self::Series(values) => Err(Error::ShapeMismatch {
                what: "d18osw",
                expected: n,
                actual: values.len(),
            }),
        }
    }
}

impl From<f64> for SeawaterD18O {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for SeawaterD18O {
    fn from(values: Vec<f64>) -> Self {
        Self::Series(values)
    }
}

impl From<&[f64]> for SeawaterD18O {
    fn from(values: &[f64]) -> Self {
        Self::Series(values.to_vec())
    }
}

/// Calibration selection for a prediction call.
///
/// No group key selects the pooled calibration. A group key (foraminifera
/// name such as `"G. bulloides"`) selects the hierarchical calibration,
/// annual or seasonal depending on `seasonal`.
///
/// ```rust
/// use bayfox::predict::PredictOptions;
///
/// let options = PredictOptions::new().group("G. ruber white").seasonal(true);
/// assert_eq!(options.group_key(), Some("G. ruber white"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictOptions {
    group: Option<String>,
    seasonal: bool,
}

impl PredictOptions {
    /// Pooled-annual calibration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a foraminifera group (hierarchical calibration)
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Mark sea temperatures as seasonal rather than annual estimates
    #[must_use]
    pub const fn seasonal(mut self, seasonal: bool) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// Selected group key, if any
    #[must_use]
    pub fn group_key(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Whether sea temperatures are seasonal
    #[must_use]
    pub const fn is_seasonal(&self) -> bool {
        self.seasonal
    }
}

/// Reject draws whose residual scale cannot parameterize a Normal.
fn check_tau(draw: usize, tau: f64) -> Result<()> {
    if tau.is_finite() && tau > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "tau must be finite and positive, got {tau} at draw {draw}"
        )))
    }
}
