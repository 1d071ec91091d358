//! # iomb - Data quality indicator matrices
//!
//! Pedigree (DQI) scores attached to the sectors of an input-output model,
//! authored as matrix literals and collapsed into one score tuple per row
//! by weighted aggregation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Literal   │────▶│  DqiMatrix  │────▶│  Aggregated │
//! │   (text)    │     │  (r x c)    │     │  (r x 1)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            ▲
//!                     ┌─────────────┐
//!                     │ Weights CSV │
//!                     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use iomb::{DqiMatrix, ScoreEntry};
//!
//! let m = DqiMatrix::parse("[ (1,2,4) (3,3,2) ; (4,2,4) (none) ]").unwrap();
//! assert_eq!(m.get(1, 1).unwrap(), &ScoreEntry::Missing);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Score entries
//! - [`dqi`] - Matrix, literal grammar and aggregation
//! - [`parser`] - Weight table CSV reading
//! - [`pipeline`] - File-level aggregation
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Matrices
pub mod dqi;

// Weight tables
pub mod parser;

// Pipeline
pub mod pipeline;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, DqiError, ParseError, PipelineError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ScoreEntry, PEDIGREE_ARITY};

// =============================================================================
// Re-exports - DQI
// =============================================================================

pub use dqi::{aggregate_entries, weighted_avg, DqiMatrix, SampleOptions};

// =============================================================================
// Re-exports - Weight tables
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, format_delimiter, parse_weights,
    parse_weights_bytes, parse_weights_bytes_auto, parse_weights_file_auto, ParseResult,
    WeightTable,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    aggregate_files, aggregate_sources, AggregateOptions, AggregateReport, CsvInfo,
};

// =============================================================================
// Re-exports - Logging
// =============================================================================

pub use logs::{LogEntry, LogLevel, RunLog};
