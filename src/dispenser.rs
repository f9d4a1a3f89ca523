//! Draw dispenser: calibration mode resolution and parameter draw lookup
//!
//! The dispenser owns the three trace stores (pooled-annual,
//! hierarchical-annual, hierarchical-seasonal). It is built once, never
//! mutated, and passed by reference into every prediction call.
//!
//! # Example
//!
//! ```rust
//! use bayfox::dispenser::DrawDispenser;
//! use bayfox::trace::{PooledTrace, TraceTable};
//!
//! # fn main() -> bayfox::Result<()> {
//! let pooled = TraceTable::from_columns([("a", vec![1.0]), ("b", vec![2.0]), ("tau", vec![3.0])])?;
//! let dispenser = DrawDispenser::builder()
//!     .pooled_annual(PooledTrace::new(pooled))
//!     .build();
//!
//! let draws = dispenser.draws(None, false)?;
//! assert_eq!(draws.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::trace::{HierarchicalTrace, McmcTrace, PooledTrace, TraceTable};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Standard file name of the pooled-annual trace dump
pub const POOLED_ANNUAL_TRACE: &str = "annual_pooled_trace.csv";
/// Standard file name of the hierarchical-annual trace dump
pub const HIERARCHICAL_ANNUAL_TRACE: &str = "annual_hierarchical_trace.csv";
/// Standard file name of the hierarchical-seasonal trace dump
pub const HIERARCHICAL_SEASONAL_TRACE: &str = "seasonal_hierarchical_trace.csv";

/// Calibration regime selecting which trace store answers a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalibrationMode {
    /// Single global calibration, annual sea temperature
    PooledAnnual,
    /// Per-group calibration, annual sea temperature
    HierarchicalAnnual,
    /// Per-group calibration, seasonal sea temperature
    HierarchicalSeasonal,
}

impl CalibrationMode {
    /// Resolve the mode from the presence of a group key and the seasonal flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousMode`] for a seasonal request without a
    /// group key: there is no pooled seasonal calibration.
    pub fn resolve(group: Option<&str>, seasonal: bool) -> Result<Self> {
        match (group, seasonal) {
            (None, false) => Ok(Self::PooledAnnual),
            (None, true) => Err(Error::AmbiguousMode),
            (Some(_), false) => Ok(Self::HierarchicalAnnual),
            (Some(_), true) => Ok(Self::HierarchicalSeasonal),
        }
    }
}

impl fmt::Display for CalibrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PooledAnnual => "pooled-annual",
            Self::HierarchicalAnnual => "hierarchical-annual",
            Self::HierarchicalSeasonal => "hierarchical-seasonal",
        };
        f.write_str(name)
    }
}

/// Index-aligned calibration parameter draws.
///
/// Entry `i` of `alpha`, `beta` and `tau` belong to the same posterior draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTriple {
    /// Intercept draws
    pub alpha: Vec<f64>,
    /// Slope draws
    pub beta: Vec<f64>,
    /// Residual standard deviation draws
    pub tau: Vec<f64>,
}

impl DrawTriple {
    /// Assemble a triple, checking the three sequences have equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `beta` or `tau` differ in length
    /// from `alpha`.
    pub fn new(alpha: Vec<f64>, beta: Vec<f64>, tau: Vec<f64>) -> Result<Self> {
        for (what, actual) in [("beta draws", beta.len()), ("tau draws", tau.len())] {
            if actual != alpha.len() {
                return Err(Error::ShapeMismatch {
                    what,
                    expected: alpha.len(),
                    actual,
                });
            }
        }
        Ok(Self { alpha, beta, tau })
    }

    /// Number of draws (`D`)
    #[must_use]
    pub fn len(&self) -> usize {
        self.tau.len()
    }

    /// True if there are no draws
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }

    /// Iterate `(alpha, beta, tau)` per draw
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.alpha
            .iter()
            .zip(&self.beta)
            .zip(&self.tau)
            .map(|((&alpha, &beta), &tau)| (alpha, beta, tau))
    }
}

type BoxedTrace = Box<dyn McmcTrace>;

/// Serves MCMC parameter draws for each calibration mode.
pub struct DrawDispenser {
    pooled_annual: Option<BoxedTrace>,
    hierarchical_annual: Option<BoxedTrace>,
    hierarchical_seasonal: Option<BoxedTrace>,
}

impl DrawDispenser {
    /// Create a builder
    #[must_use]
    pub fn builder() -> DrawDispenserBuilder {
        DrawDispenserBuilder::default()
    }

    /// Load the three standard CSV trace dumps from `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if any dump is missing or malformed.
    pub fn from_resource_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let pooled = TraceTable::load_csv(dir.join(POOLED_ANNUAL_TRACE))?;
        let annual = TraceTable::load_csv(dir.join(HIERARCHICAL_ANNUAL_TRACE))?;
        let seasonal = TraceTable::load_csv(dir.join(HIERARCHICAL_SEASONAL_TRACE))?;

        Ok(Self::builder()
            .pooled_annual(PooledTrace::new(pooled))
            .hierarchical_annual(HierarchicalTrace::new(annual))
            .hierarchical_seasonal(HierarchicalTrace::new(seasonal))
            .build())
    }

    /// Trace store backing `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTrace`] if the dispenser was built without it.
    pub fn trace(&self, mode: CalibrationMode) -> Result<&dyn McmcTrace> {
        let slot = match mode {
            CalibrationMode::PooledAnnual => &self.pooled_annual,
            CalibrationMode::HierarchicalAnnual => &self.hierarchical_annual,
            CalibrationMode::HierarchicalSeasonal => &self.hierarchical_seasonal,
        };
        slot.as_deref().ok_or(Error::MissingTrace(mode))
    }

    /// Intercept, slope and residual scale draws for a group/season request.
    ///
    /// # Errors
    ///
    /// Returns error if the mode is ambiguous, its trace is missing, or the
    /// trace lacks the parameters for `group`.
    pub fn draws(&self, group: Option<&str>, seasonal: bool) -> Result<DrawTriple> {
        let mode = CalibrationMode::resolve(group, seasonal)?;
        let trace = self.trace(mode)?;

        let triple = DrawTriple::new(
            trace.grab("a", group)?,
            trace.grab("b", group)?,
            trace.grab("tau", group)?,
        )?;
        debug!(%mode, group, draws = triple.len(), "dispensed calibration draws");
        Ok(triple)
    }
}

impl fmt::Debug for DrawDispenser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawDispenser")
            .field("pooled_annual", &self.pooled_annual.as_ref().map(|t| t.draw_count()))
            .field(
                "hierarchical_annual",
                &self.hierarchical_annual.as_ref().map(|t| t.draw_count()),
            )
            .field(
                "hierarchical_seasonal",
                &self.hierarchical_seasonal.as_ref().map(|t| t.draw_count()),
            )
            .finish()
    }
}

/// Builder for [`DrawDispenser`]. Stores left unset fail at lookup time.
#[derive(Default)]
pub struct DrawDispenserBuilder {
    pooled_annual: Option<BoxedTrace>,
    hierarchical_annual: Option<BoxedTrace>,
    hierarchical_seasonal: Option<BoxedTrace>,
}

impl DrawDispenserBuilder {
    /// Set the pooled-annual store
    #[must_use]
    pub fn pooled_annual(mut self, trace: impl McmcTrace + 'static) -> Self {
        self.pooled_annual = Some(Box::new(trace));
        self
    }

    /// Set the hierarchical-annual store
    #[must_use]
    pub fn hierarchical_annual(mut self, trace: impl McmcTrace + 'static) -> Self {
        self.hierarchical_annual = Some(Box::new(trace));
        self
    }

    /// Set the hierarchical-seasonal store
    #[must_use]
    pub fn hierarchical_seasonal(mut self, trace: impl McmcTrace + 'static) -> Self {
        self.hierarchical_seasonal = Some(Box::new(trace));
        self
    }

    /// Build the dispenser
    #[must_use]
    pub fn build(self) -> DrawDispenser {
        DrawDispenser {
            pooled_annual: self.pooled_annual,
            hierarchical_annual: self.hierarchical_annual,
            hierarchical_seasonal: self.hierarchical_seasonal,
        }
    }
}
