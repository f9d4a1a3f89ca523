//! Pooled trace: one global calibration, no group namespaces.

use super::{McmcTrace, TraceTable};
use crate::{Error, Result};

/// MCMC draws for the pooled calibration model.
///
/// # Example
///
/// ```rust
/// use bayfox::trace::{PooledTrace, TraceTable};
///
/// # fn main() -> bayfox::Result<()> {
/// let table = TraceTable::from_columns([("a", vec![3.3]), ("b", vec![-0.22]), ("tau", vec![0.6])])?;
/// let trace = PooledTrace::new(table);
/// assert_eq!(trace.grab("tau")?, vec![0.6]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PooledTrace {
    table: TraceTable,
}

impl PooledTrace {
    /// Wrap a trace table holding pooled draws.
    #[must_use]
    pub const fn new(table: TraceTable) -> Self {
        Self { table }
    }

    /// Copy of the draws for `param`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the table has no such column.
    pub fn grab(&self, param: &str) -> Result<Vec<f64>> {
        self.table
            .column(param)
            .ok_or_else(|| Error::KeyNotFound(param.to_string()))
    }
}

impl McmcTrace for PooledTrace {
    fn grab(&self, param: &str, group: Option<&str>) -> Result<Vec<f64>> {
        match group {
            None => Self::grab(self, param),
            Some(group) => Err(Error::UnexpectedGroup(group.to_string())),
        }
    }

    fn draw_count(&self) -> usize {
        self.table.draw_count()
    }
}
