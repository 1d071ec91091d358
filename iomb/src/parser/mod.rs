//! Weight table reader with encoding and delimiter auto-detection.
//!
//! A weight table is a labelled CSV matrix: the header row holds the column
//! labels (its first cell is a corner label and ignored), every data row
//! starts with a row label followed by one numeric weight per column.
//!
//! ```text
//! sector;S1;S2
//! 1111A0;0.4;0.7
//! 1111B0;0.1;0.5
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// A labelled matrix of aggregation weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// One row of weights per row label
    pub values: Vec<Vec<f64>>,
}

impl WeightTable {
    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    /// Weights of the row with the given label
    pub fn row(&self, label: &str) -> Option<&[f64]> {
        self.row_labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i].as_slice())
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: WeightTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| CsvError::Encoding(format!("invalid UTF-8: {}", e))),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => encoding_rs::Encoding::for_label(other.as_bytes())
            .map(|enc| enc.decode(bytes).0.into_owned())
            .ok_or_else(|| CsvError::Encoding(format!("unsupported encoding '{}'", encoding))),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Printable form of a delimiter, with tab shown as `\t`
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Parse a weight table with an explicit delimiter.
///
/// Empty cells are read as weight `0.0`.
///
/// # Example
/// ```
/// use iomb::parse_weights;
///
/// let table = parse_weights("sector,S1,S2\nA,0.4,0.7\nB,0.1,", ',').unwrap();
/// assert_eq!(table.shape(), (2, 2));
/// assert_eq!(table.row("B"), Some(&[0.1, 0.0][..]));
/// ```
pub fn parse_weights(content: &str, delimiter: char) -> CsvResult<WeightTable> {
    if !delimiter.is_ascii() {
        return Err(CsvError::Malformed(format!(
            "delimiter '{}' is not an ASCII character",
            delimiter
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let col_labels: Vec<String> = headers.iter().skip(1).map(String::from).collect();

    let mut row_labels = Vec::new();
    let mut values = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let mut row = Vec::with_capacity(col_labels.len());
        for (label, field) in col_labels.iter().zip(record.iter().skip(1)) {
            if field.is_empty() {
                row.push(0.0);
                continue;
            }
            let weight = field.parse::<f64>().map_err(|_| CsvError::InvalidValue {
                line,
                column: label.clone(),
                value: field.to_string(),
            })?;
            row.push(weight);
        }

        row_labels.push(record.get(0).unwrap_or("").to_string());
        values.push(row);
    }

    Ok(WeightTable {
        row_labels,
        col_labels,
        values,
    })
}

/// Parse weight table bytes; encoding is always detected, the delimiter
/// only when not given.
pub fn parse_weights_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let table = parse_weights(&content, delimiter)?;
    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse weight table bytes with auto-detection of encoding and delimiter.
pub fn parse_weights_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    parse_weights_bytes(bytes, None)
}

/// Parse a weight table file with auto-detection of encoding and delimiter.
pub fn parse_weights_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_weights_bytes_auto(&bytes)
}
