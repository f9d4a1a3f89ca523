//! # bayfox: Bayesian planktic foraminifera δ18O calibration
//!
//! bayfox converts between sea-surface temperature, seawater δ18O and
//! foraminiferal calcite δ18O using precomputed MCMC draws of a Bayesian
//! calibration model.
//!
//! ## Components
//!
//! - [`trace`]: columnar (Arrow) tables of MCMC draws, pooled or per group
//! - [`dispenser`]: picks the calibration (pooled-annual,
//!   hierarchical-annual, hierarchical-seasonal) and serves `(a, b, tau)`
//! - [`predict`]: forward model ([`predict_d18oc`]), inverse model
//!   ([`predict_seatemp`]) and the [`Prediction`] ensemble wrapper
//!
//! ## Example
//!
//! ```rust
//! use bayfox::{
//!     predict_seatemp, DrawDispenser, Interpolation, PredictOptions, SeatempPrior, SeawaterD18O,
//! };
//! use bayfox::trace::{HierarchicalTrace, TraceTable};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> bayfox::Result<()> {
//! let seasonal = TraceTable::from_columns([
//!     ("a__G. bulloides", vec![3.1, 3.3, 3.2]),
//!     ("b__G. bulloides", vec![-0.21, -0.23, -0.22]),
//!     ("tau__G. bulloides", vec![0.5, 0.6, 0.55]),
//! ])?;
//! let dispenser = DrawDispenser::builder()
//!     .hierarchical_seasonal(HierarchicalTrace::new(seasonal))
//!     .build();
//!
//! let mut rng = StdRng::seed_from_u64(2024);
//! let prediction = predict_seatemp(
//!     &[-1.2, -0.8],
//!     &SeawaterD18O::Scalar(0.4),
//!     SeatempPrior::new(15.0, 10.0),
//!     &PredictOptions::new().group("G. bulloides").seasonal(true),
//!     &dispenser,
//!     &mut rng,
//! )?;
//!
//! let bands = prediction.percentile(None, Interpolation::Nearest)?;
//! assert_eq!(bands.dim(), (2, 3));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod dispenser;
pub mod error;
pub mod predict;
pub mod trace;

pub use dispenser::{CalibrationMode, DrawDispenser, DrawTriple};
pub use error::{Error, Result};
pub use predict::{
    predict_d18oc, predict_seatemp, Interpolation, PredictOptions, Prediction, SeatempPrior,
    SeawaterD18O, VSMOW_TO_VPDB,
};
