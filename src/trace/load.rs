//! Trace dump loading (CSV / Parquet)
//!
//! Trace dumps are flat tables: a header row of column names followed by
//! one row per posterior draw. Column names are kept verbatim, including
//! spaces and dots in group keys (`a__G. ruber pink`).

use super::TraceTable;
use crate::{Error, Result};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

impl TraceTable {
    /// Parse a CSV trace dump. Every column is read as `Float64`.
    ///
    /// # Errors
    ///
    /// Returns error if the data cannot be read or a field is not numeric.
    pub fn from_csv_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        // Only the header is needed; every draw column is Float64 regardless
        // of what inference would pick from the first rows.
        let (inferred, _) = Format::default()
            .with_header(true)
            .infer_schema(Cursor::new(&bytes), Some(0))
            .map_err(|e| Error::StorageError(format!("Failed to read CSV header: {e}")))?;
        if inferred.fields().is_empty() {
            return Err(Error::StorageError("CSV trace dump has no columns".to_string()));
        }

        let schema = Arc::new(Schema::new(
            inferred
                .fields()
                .iter()
                .map(|field| Field::new(field.name(), DataType::Float64, true))
                .collect::<Vec<_>>(),
        ));

        let csv = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(true)
            .build(Cursor::new(bytes))
            .map_err(|e| Error::StorageError(format!("Failed to create CSV reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in csv {
            let batch = batch
                .map_err(|e| Error::StorageError(format!("Failed to read CSV record batch: {e}")))?;
            batches.push(batch);
        }
        if batches.is_empty() {
            // header only: zero draws
            batches.push(RecordBatch::new_empty(schema));
        }

        Self::new(batches)
    }

    /// Load a CSV trace dump from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or parsed.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open CSV file {}: {e}", path.display()))
        })?;

        let table = Self::from_csv_reader(file)?;
        info!(path = %path.display(), draws = table.draw_count(), "loaded CSV trace");
        Ok(table)
    }

    /// Load a Parquet trace dump from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;

        let schema = Arc::clone(builder.schema());
        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }
        if batches.is_empty() {
            batches.push(RecordBatch::new_empty(schema));
        }

        let table = Self::new(batches)?;
        info!(path = %path.display(), draws = table.draw_count(), "loaded Parquet trace");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "a__G. ruber pink,b__G. ruber pink,tau__G. ruber pink\n\
                        1.5,2,0.5\n\
                        1.25,-2.5,0.75\n";

    #[test]
    fn test_csv_keeps_column_names_verbatim() {
        let table = TraceTable::from_csv_reader(DUMP.as_bytes()).unwrap();

        assert_eq!(table.draw_count(), 2);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["a__G. ruber pink", "b__G. ruber pink", "tau__G. ruber pink"]
        );
        assert_eq!(table.column("b__G. ruber pink"), Some(vec![2.0, -2.5]));
    }

    #[test]
    fn test_csv_header_only_has_zero_draws() {
        let table = TraceTable::from_csv_reader("a,b,tau\n".as_bytes()).unwrap();

        assert_eq!(table.draw_count(), 0);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b", "tau"]);
        assert_eq!(table.column("tau"), Some(vec![]));
    }

    #[test]
    fn test_csv_rejects_non_numeric() {
        let result = TraceTable::from_csv_reader("a,b\n1.0,oops\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_rejects_missing_draws() {
        let result = TraceTable::from_csv_reader("a,b\n1.0,\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = TraceTable::load_csv("/nonexistent/bayfox/trace.csv").unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }

    #[test]
    fn test_load_parquet_missing_file() {
        let err = TraceTable::load_parquet("/nonexistent/bayfox/trace.parquet").unwrap_err();
        assert!(err.to_string().contains("Failed to open Parquet file"));
    }
}
