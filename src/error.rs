//! Error types for bayfox
//!
//! Lookup failures carry enough context (valid group keys, expected lengths)
//! for the caller to fix the request without digging through trace dumps.

use crate::dispenser::CalibrationMode;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// bayfox error types
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter column absent from a trace store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Parameter exists for other groups, but not for the requested one
    #[error("Bad group: {group}\nPossible groups are: {}", .valid.join(", "))]
    BadGroup {
        /// Requested group key
        group: String,
        /// Group keys present in the trace store
        valid: Vec<String>,
    },

    /// Hierarchical trace queried without a group key
    #[error("Hierarchical trace requires a group key to grab parameter `{0}`")]
    MissingGroup(String),

    /// Pooled trace queried with a group key
    #[error("Pooled trace does not take a group key (got `{0}`)")]
    UnexpectedGroup(String),

    /// Draw dispenser was built without the store for a calibration mode
    #[error("No trace loaded for calibration mode {0}")]
    MissingTrace(CalibrationMode),

    /// Seasonal temperatures requested without a group key
    #[error("Ambiguous calibration mode: seasonal sea temperature requires a group key")]
    AmbiguousMode,

    /// Observation vectors cannot be broadcast together
    #[error("Shape mismatch for {what}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the offending input
        what: &'static str,
        /// Length required by broadcasting
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// Model or prior parameter that would produce non-finite output
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input (bad percentile request, malformed table)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Trace loading error (CSV/Parquet)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
