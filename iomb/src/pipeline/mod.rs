//! High-level pipeline API for aggregating DQI matrices from files.
//!
//! Combines literal parsing, weight table reading and column aggregation.
//!
//! # Example
//!
//! ```rust,ignore
//! use iomb::pipeline::{aggregate_files, AggregateOptions};
//! use std::path::Path;
//!
//! let report = aggregate_files(
//!     Path::new("dqi.txt"),
//!     Path::new("weights.csv"),
//!     &AggregateOptions::default(),
//! )?;
//! println!("{}", report.aggregated);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::dqi::DqiMatrix;
use crate::error::{DqiError, PipelineResult};
use crate::logs::{LogEntry, RunLog};
use crate::parser::{format_delimiter, parse_weights_bytes, ParseResult};

/// Options for the aggregation pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Weight table delimiter; auto-detected when absent
    #[serde(default)]
    pub delimiter: Option<char>,

    /// Record progress without echoing it to stderr
    #[serde(default)]
    pub quiet: bool,
}

impl AggregateOptions {
    fn run_log(&self) -> RunLog {
        if self.quiet {
            RunLog::silent()
        } else {
            RunLog::echoing()
        }
    }
}

/// Result of an aggregation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// `(rows, 1)` matrix of aggregated entries
    pub aggregated: DqiMatrix,

    /// Row labels from the weight table
    pub row_labels: Vec<String>,

    /// Weight table metadata
    pub csv_info: CsvInfo,

    /// Number of rows without any scores
    pub missing_rows: usize,

    /// Progress and warnings of the run
    pub log: Vec<LogEntry>,
}

/// Weight table information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub rows: usize,
    pub cols: usize,
}

/// Aggregate the matrix literal in `matrix_path` with the weight table in
/// `weights_path`.
pub fn aggregate_files(
    matrix_path: &Path,
    weights_path: &Path,
    options: &AggregateOptions,
) -> PipelineResult<AggregateReport> {
    let mut log = options.run_log();

    log.info(format!("📖 Reading matrix: {}", matrix_path.display()));
    let literal = fs::read_to_string(matrix_path)?;

    log.info(format!("📖 Reading weights: {}", weights_path.display()));
    let weights = fs::read(weights_path)?;

    aggregate_logged(&literal, &weights, options, log)
}

/// Aggregate a matrix literal with raw weight table bytes.
pub fn aggregate_sources(
    literal: &str,
    weights: &[u8],
    options: &AggregateOptions,
) -> PipelineResult<AggregateReport> {
    aggregate_logged(literal, weights, options, options.run_log())
}

fn aggregate_logged(
    literal: &str,
    weights: &[u8],
    options: &AggregateOptions,
    mut log: RunLog,
) -> PipelineResult<AggregateReport> {
    let matrix = DqiMatrix::parse(literal)?;
    log.success(format!(
        "Parsed {}x{} matrix (arity {})",
        matrix.rows(),
        matrix.cols(),
        matrix.arity().map_or_else(|| "-".to_string(), |a| a.to_string())
    ));

    let ParseResult {
        table,
        encoding,
        delimiter,
    } = parse_weights_bytes(weights, options.delimiter)?;
    log.success(format!("Detected encoding: {}", encoding));
    log.success(format!("Using separator: '{}'", format_delimiter(delimiter)));

    let (rows, cols) = table.shape();
    if (rows, cols) != matrix.shape() {
        log.error(format!(
            "Weight table is {}x{}, matrix is {}x{}",
            rows,
            cols,
            matrix.rows(),
            matrix.cols()
        ));
        return Err(DqiError::ShapeMismatch {
            expected_rows: matrix.rows(),
            expected_cols: matrix.cols(),
            found_rows: rows,
            found_cols: cols,
        }
        .into());
    }

    let aggregated = matrix.aggregate_columns(&table.values)?;

    let mut missing_rows = 0;
    for (label, row) in table.row_labels.iter().zip(aggregated.iter_rows()) {
        if row.iter().all(|e| e.is_missing()) {
            missing_rows += 1;
            log.info_indent(format!("row '{}' has no scores", label), 1);
        }
    }
    if missing_rows > 0 {
        log.warning(format!("{} of {} rows aggregated to (none)", missing_rows, rows));
    }
    log.success(format!("Aggregated {} columns into 1", cols));

    Ok(AggregateReport {
        aggregated,
        row_labels: table.row_labels,
        csv_info: CsvInfo {
            encoding,
            delimiter,
            rows,
            cols,
        },
        missing_rows,
        log: log.into_entries(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::logs::LogLevel;
    use crate::models::ScoreEntry;
    use tempfile::tempdir;

    const LITERAL: &str = "
        [ (4,1,3) (2,1,5) ;
          (4,5,3) (1,5,1) ;
          (2,1,5) (3,1,4) ]
    ";

    const WEIGHTS: &str = "sector;S1;S2\nA;0.4;0.7\nB;0.1;0.5\nC;0.9;0.2\n";

    #[test]
    fn test_aggregate_files() {
        let dir = tempdir().unwrap();
        let matrix_path = dir.path().join("dqi.txt");
        let weights_path = dir.path().join("weights.csv");
        fs::write(&matrix_path, LITERAL).unwrap();
        fs::write(&weights_path, WEIGHTS).unwrap();

        let report =
            aggregate_files(&matrix_path, &weights_path, &AggregateOptions::default()).unwrap();

        assert!(report.log[0].message.starts_with("📖 Reading matrix"));

        assert_eq!(report.aggregated.shape(), (3, 1));
        assert_eq!(report.aggregated.get(0, 0).unwrap(), &ScoreEntry::from([3, 1, 4]));
        assert_eq!(report.aggregated.get(1, 0).unwrap(), &ScoreEntry::from([2, 5, 1]));
        assert_eq!(report.aggregated.get(2, 0).unwrap(), &ScoreEntry::from([2, 1, 5]));
        assert_eq!(report.row_labels, vec!["A", "B", "C"]);
        assert_eq!(report.csv_info.delimiter, ';');
        assert_eq!(report.missing_rows, 0);
    }

    #[test]
    fn test_missing_rows_counted() {
        let literal = "[ (none) (none) ; (1,2) (none) ]";
        let weights = "x,a,b\nr1,1,1\nr2,1,0\n";
        let options = AggregateOptions {
            quiet: true,
            ..Default::default()
        };
        let report = aggregate_sources(literal, weights.as_bytes(), &options).unwrap();

        assert_eq!(report.missing_rows, 1);
        assert_eq!(report.aggregated.get(1, 0).unwrap(), &ScoreEntry::from([1, 2]));

        let warnings: Vec<&LogEntry> = report
            .log
            .iter()
            .filter(|e| e.level == LogLevel::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "1 of 2 rows aggregated to (none)");
        assert!(report
            .log
            .iter()
            .any(|e| e.indent == 1 && e.message == "row 'r1' has no scores"));
    }

    #[test]
    fn test_report_log_without_warnings() {
        let report =
            aggregate_sources(LITERAL, WEIGHTS.as_bytes(), &AggregateOptions::default()).unwrap();

        assert!(report.log.iter().all(|e| e.level != LogLevel::Warning));
        assert_eq!(
            report.log.last().map(|e| e.message.as_str()),
            Some("Aggregated 2 columns into 1")
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let weights = "x,a\nr1,1\n";
        let result = aggregate_sources(LITERAL, weights.as_bytes(), &AggregateOptions::default());
        assert!(matches!(
            result,
            Err(PipelineError::Dqi(DqiError::ShapeMismatch { found_rows: 1, found_cols: 1, .. }))
        ));
    }

    #[test]
    fn test_parse_error_propagates() {
        let options = AggregateOptions::default();
        let result = aggregate_sources("[ (1,2 ]", WEIGHTS.as_bytes(), &options);
        assert!(matches!(result, Err(PipelineError::Dqi(DqiError::Parse(_)))));
    }

    #[test]
    fn test_explicit_delimiter() {
        let weights = "x|a|b\nr1|0.4|0.7\n";
        let options = AggregateOptions {
            delimiter: Some('|'),
            ..Default::default()
        };
        let report =
            aggregate_sources("[ (4,1,3) (2,1,5) ]", weights.as_bytes(), &options).unwrap();
        assert_eq!(report.aggregated.get(0, 0).unwrap(), &ScoreEntry::from([3, 1, 4]));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = aggregate_files(
            &dir.path().join("nope.txt"),
            &dir.path().join("nope.csv"),
            &AggregateOptions::default(),
        );
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }
}
