//! MCMC trace storage (Arrow columnar format)
//!
//! A trace table holds one posterior draw per row and one calibration
//! parameter per column. Hierarchical traces namespace their columns by
//! foraminifera group, e.g. `a__G. bulloides`.
//!
//! Tables are read-only after construction. Every extraction returns an
//! owned copy, so callers can mutate draws without touching the store.
//!
//! # Example
//!
//! ```rust
//! use bayfox::trace::{HierarchicalTrace, TraceTable};
//!
//! # fn main() -> bayfox::Result<()> {
//! let table = TraceTable::from_columns([
//!     ("a__G. bulloides", vec![-3.2, -3.1]),
//!     ("b__G. bulloides", vec![-0.2, -0.21]),
//!     ("tau__G. bulloides", vec![0.5, 0.55]),
//! ])?;
//! let trace = HierarchicalTrace::new(table);
//!
//! assert_eq!(trace.groups(), ["G. bulloides"]);
//! assert_eq!(trace.grab("b", "G. bulloides")?, vec![-0.2, -0.21]);
//! # Ok(())
//! # }
//! ```

mod hierarchical;
mod load;
mod pooled;

pub use hierarchical::HierarchicalTrace;
pub use pooled::PooledTrace;

use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Separator between parameter name and group key in hierarchical columns
pub const GROUP_SEPARATOR: &str = "__";

/// Uniform draw extraction over pooled and hierarchical traces.
///
/// Implementations must return a fresh copy on every call. The draw
/// dispenser only talks to this trait, so tests can substitute fakes.
pub trait McmcTrace: Send + Sync {
    /// Return the draws of `param`, optionally restricted to `group`.
    ///
    /// # Errors
    ///
    /// - [`Error::KeyNotFound`] if the parameter is absent
    /// - [`Error::BadGroup`] if the parameter exists only for other groups
    /// - [`Error::MissingGroup`] / [`Error::UnexpectedGroup`] if the group
    ///   argument does not suit the trace variant
    fn grab(&self, param: &str, group: Option<&str>) -> Result<Vec<f64>>;

    /// Number of posterior draws (rows) in the trace
    fn draw_count(&self) -> usize;
}

/// Columnar table of MCMC draws, all columns `Float64` and null-free.
#[derive(Debug, Clone)]
pub struct TraceTable {
    batch: RecordBatch,
}

impl TraceTable {
    /// Build a trace table from record batches.
    ///
    /// Batches are concatenated into one logical table. Integer columns are
    /// cast to `Float64`.
    ///
    /// # Errors
    ///
    /// Returns error if no batch is given, a column is not numeric or holds
    /// nulls, or the batches disagree on schema.
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        let mut normalized: Vec<RecordBatch> = Vec::with_capacity(batches.len());
        for batch in &batches {
            let batch = normalize_batch(batch)?;
            if let Some(first) = normalized.first() {
                if batch.schema() != first.schema() {
                    return Err(Error::StorageError(format!(
                        "Schema mismatch: expected {:?}, got {:?}",
                        first.schema(),
                        batch.schema()
                    )));
                }
            }
            normalized.push(batch);
        }

        let schema = normalized
            .first()
            .map(RecordBatch::schema)
            .ok_or_else(|| Error::InvalidInput("trace table has no record batches".to_string()))?;
        let batch = concat_batches(&schema, normalized.iter())?;

        Ok(Self { batch })
    }

    /// Build a trace table from named draw columns.
    ///
    /// # Errors
    ///
    /// Returns error if the columns differ in length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns
            .into_iter()
            .map(|(name, draws)| {
                (
                    Field::new(name, DataType::Float64, false),
                    Arc::new(Float64Array::from(draws)) as ArrayRef,
                )
            })
            .unzip();

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Self::new(vec![batch])
    }

    /// Number of draws (rows)
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.name().as_str())
    }

    /// Copy of one column's draws, or `None` if absent
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        self.batch
            .column_by_name(name)?
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|array| array.values().to_vec())
    }

    /// Underlying record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

/// Cast every column to non-null `Float64`.
fn normalize_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        if !column.data_type().is_numeric() {
            return Err(Error::InvalidInput(format!(
                "trace column `{}` has non-numeric type {:?}",
                field.name(),
                column.data_type()
            )));
        }
        if column.null_count() > 0 {
            return Err(Error::InvalidInput(format!(
                "trace column `{}` has {} missing draws",
                field.name(),
                column.null_count()
            )));
        }

        let column = if column.data_type() == &DataType::Float64 {
            Arc::clone(column)
        } else {
            cast(column, &DataType::Float64)?
        };
        fields.push(Field::new(field.name(), DataType::Float64, false));
        columns.push(column);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
