//! Error types for the DQI matrix engine.
//!
//! - [`DqiError`] - matrix indexing, literal parsing and aggregation errors
//! - [`CsvError`] - weight table reading errors
//! - [`PipelineError`] - top-level errors of the file pipeline
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

pub use crate::dqi::literal::ParseError;

// =============================================================================
// Matrix Errors
// =============================================================================

/// Errors raised by [`crate::DqiMatrix`] and the aggregation functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DqiError {
    /// Coordinate outside of the matrix shape.
    #[error("Index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    Index {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Malformed matrix literal.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Score tuples of different length where one length is required.
    #[error("Arity mismatch at {location}: expected {expected} scores, found {found}")]
    ArityMismatch {
        location: String,
        expected: usize,
        found: usize,
    },

    /// Weight matrix does not have the shape of the source matrix.
    #[error("Weights are {found_rows}x{found_cols}, expected {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },

    /// Number of weights differs from the number of values.
    #[error("Got {values} values but {weights} weights")]
    WeightCount { values: usize, weights: usize },

    /// Weighted average is undefined for the given weights.
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    /// Random sampling bounds are inverted.
    #[error("Invalid sample range: low {low} is greater than high {high}")]
    InvalidSampleRange { low: i32, high: i32 },
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading a weight table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Structurally invalid CSV (ragged rows, bad quoting).
    #[error("Invalid CSV format: {0}")]
    Malformed(String),

    /// No header row.
    #[error("CSV file is empty")]
    EmptyFile,

    /// A weight cell is not a number.
    #[error("Line {line}, column '{column}': invalid weight '{value}'")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::Malformed(err.to_string())
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors of [`crate::pipeline::aggregate_files`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Matrix error.
    #[error("DQI error: {0}")]
    Dqi(#[from] DqiError),

    /// Weight table error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for PipelineError {
    fn from(err: ParseError) -> Self {
        PipelineError::Dqi(DqiError::Parse(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for matrix operations.
pub type DqiResult<T> = Result<T, DqiError>;

/// Result type for weight table reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
