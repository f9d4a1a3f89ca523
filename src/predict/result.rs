//! Prediction result: ensemble ownership and percentile summaries.

use crate::{Error, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Percentiles used when the caller does not ask for specific ones
pub const DEFAULT_PERCENTILES: [f64; 3] = [5.0, 50.0, 95.0];

/// Rule for picking a percentile between two ranked draws.
///
/// With sorted draws `v` of length `D`, the fractional rank of percentile
/// `q` is `r = q / 100 * (D - 1)`, `lo = floor(r)`, `hi = ceil(r)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// `v[round(r)]`, exact halves round to the even index
    #[default]
    Nearest,
    /// `v[lo] + (r - lo) * (v[hi] - v[lo])`
    Linear,
    /// `v[lo]`
    Lower,
    /// `v[hi]`
    Higher,
    /// `(v[lo] + v[hi]) / 2`
    Midpoint,
}

impl Interpolation {
    /// Percentile `q` (0..=100) of an ascending, non-empty slice.
    fn pick(self, sorted: &[f64], q: f64) -> f64 {
        let last = sorted.len() - 1;
        let rank = q / 100.0 * last as f64;
        let lo = (rank.floor() as usize).min(last);
        let hi = (rank.ceil() as usize).min(last);

        match self {
            Self::Nearest => sorted[(round_half_even(rank) as usize).min(last)],
            Self::Linear => {
                let (low, high) = (sorted[lo], sorted[hi]);
                let value = low + (rank - lo as f64) * (high - low);
                // NaN sorts last; only clamp between ordered, comparable bounds
                if low.is_nan() || high.is_nan() {
                    value
                } else {
                    value.clamp(low, high)
                }
            }
            Self::Lower => sorted[lo],
            Self::Higher => sorted[hi],
            Self::Midpoint => (sorted[lo] + sorted[hi]) / 2.0,
        }
    }
}

fn round_half_even(x: f64) -> f64 {
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        x.round()
    }
}

/// Posterior ensemble from a forward or inverse prediction.
///
/// Rows are observations, columns are MCMC draws. The ensemble is fixed at
/// construction; summaries never modify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    ensemble: Array2<f64>,
}

impl Prediction {
    /// Wrap an `N x D` ensemble
    #[must_use]
    pub const fn new(ensemble: Array2<f64>) -> Self {
        Self { ensemble }
    }

    /// The `N x D` ensemble
    #[must_use]
    pub const fn ensemble(&self) -> &Array2<f64> {
        &self.ensemble
    }

    /// Take ownership of the ensemble
    #[must_use]
    pub fn into_ensemble(self) -> Array2<f64> {
        self.ensemble
    }

    /// Number of observations (`N`)
    #[must_use]
    pub fn n_observations(&self) -> usize {
        self.ensemble.nrows()
    }

    /// Number of draws (`D`)
    #[must_use]
    pub fn n_draws(&self) -> usize {
        self.ensemble.ncols()
    }

    /// Percentiles of each observation across draws.
    ///
    /// Returns an `N x len(q)` table. `q` defaults to
    /// [`DEFAULT_PERCENTILES`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a percentile lies outside
    /// `[0, 100]` or the ensemble has no draws.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bayfox::predict::{Interpolation, Prediction};
    /// use ndarray::array;
    ///
    /// # fn main() -> bayfox::Result<()> {
    /// let prediction = Prediction::new(array![[0.0, 1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0, 9.0]]);
    /// let perc = prediction.percentile(Some(&[0.0, 50.0, 100.0]), Interpolation::Nearest)?;
    /// assert_eq!(perc, array![[0.0, 2.0, 4.0], [5.0, 7.0, 9.0]]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn percentile(&self, q: Option<&[f64]>, interpolation: Interpolation) -> Result<Array2<f64>> {
        let q = q.unwrap_or(&DEFAULT_PERCENTILES);
        if let Some(bad) = q.iter().find(|p| !(0.0..=100.0).contains(*p)) {
            return Err(Error::InvalidInput(format!(
                "percentiles must be in [0, 100], got {bad}"
            )));
        }
        if self.n_draws() == 0 {
            return Err(Error::InvalidInput(
                "cannot take percentiles of an ensemble with no draws".to_string(),
            ));
        }

        let mut out = Array2::<f64>::zeros((self.n_observations(), q.len()));
        for (row, mut out_row) in self.ensemble.rows().into_iter().zip(out.rows_mut()) {
            let sorted = sorted_row(row);
            for (slot, &p) in out_row.iter_mut().zip(q) {
                *slot = interpolation.pick(&sorted, p);
            }
        }
        Ok(out)
    }
}

fn sorted_row(row: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut values = row.to_vec();
    values.sort_by(f64::total_cmp);
    values
}
