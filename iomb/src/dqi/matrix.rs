//! DQI matrix definition
//!
//! A dense `rows x cols` grid of [`ScoreEntry`] cells, addressed zero-based.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::aggregate::aggregate_entries;
use super::literal;
use crate::error::{DqiError, DqiResult};
use crate::models::{ScoreEntry, PEDIGREE_ARITY};

/// A matrix of quality score tuples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MatrixRepr", try_from = "MatrixRepr")]
pub struct DqiMatrix {
    rows: usize,
    cols: usize,
    /// Row-major cells.
    cells: Vec<ScoreEntry>,
}

/// JSON form: `{"rows": 2, "cols": 1, "entries": [[[1,2]], [null]]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    entries: Vec<Vec<ScoreEntry>>,
}

/// Options for random matrix generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleOptions {
    /// Scores per cell
    pub arity: usize,

    /// Smallest score (inclusive)
    pub low: i32,

    /// Largest score (inclusive)
    pub high: i32,

    /// Seed for reproducible samples; thread-local entropy if absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            arity: PEDIGREE_ARITY,
            low: 1,
            high: 5,
            seed: None,
        }
    }
}

impl DqiMatrix {
    /// Create a matrix with every cell missing
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![ScoreEntry::Missing; rows * cols],
        }
    }

    pub(crate) fn from_rows(rows: usize, cols: usize, cells: Vec<ScoreEntry>) -> Self {
        debug_assert_eq!(cells.len(), rows * cols);
        Self { rows, cols, cells }
    }

    /// Parse a matrix from its literal form, see [`literal::parse`]
    pub fn parse(text: &str) -> DqiResult<Self> {
        literal::parse(text)
    }

    /// Random matrix with pedigree-sized entries, scores in `1..=5`
    pub fn rand(rows: usize, cols: usize) -> Self {
        let options = SampleOptions::default();
        Self::fill_random(rows, cols, &options, &mut rand::thread_rng())
    }

    /// Random matrix with every cell populated according to `options`
    pub fn sample(rows: usize, cols: usize, options: &SampleOptions) -> DqiResult<Self> {
        if options.low > options.high {
            return Err(DqiError::InvalidSampleRange {
                low: options.low,
                high: options.high,
            });
        }
        let matrix = match options.seed {
            Some(seed) => Self::fill_random(rows, cols, options, &mut StdRng::seed_from_u64(seed)),
            None => Self::fill_random(rows, cols, options, &mut rand::thread_rng()),
        };
        Ok(matrix)
    }

    fn fill_random<R: Rng>(rows: usize, cols: usize, options: &SampleOptions, rng: &mut R) -> Self {
        let cells = (0..rows * cols)
            .map(|_| {
                let scores: Vec<i32> = (0..options.arity)
                    .map(|_| rng.gen_range(options.low..=options.high))
                    .collect();
                ScoreEntry::Present(scores)
            })
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn index(&self, row: usize, col: usize) -> DqiResult<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(DqiError::Index {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Get the entry at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> DqiResult<&ScoreEntry> {
        let idx = self.index(row, col)?;
        Ok(&self.cells[idx])
    }

    /// Set the entry at `(row, col)`.
    ///
    /// The arity of `value` is not checked against the other cells.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<ScoreEntry>) -> DqiResult<()> {
        let idx = self.index(row, col)?;
        self.cells[idx] = value.into();
        Ok(())
    }

    /// All entries of one row
    pub fn row(&self, row: usize) -> DqiResult<&[ScoreEntry]> {
        if row >= self.rows {
            return Err(DqiError::Index {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let start = row * self.cols;
        Ok(&self.cells[start..start + self.cols])
    }

    /// Iterate over rows as slices
    pub fn iter_rows(&self) -> impl Iterator<Item = &[ScoreEntry]> + '_ {
        (0..self.rows).map(move |r| &self.cells[r * self.cols..(r + 1) * self.cols])
    }

    /// Arity of the first populated cell in row-major order
    pub fn arity(&self) -> Option<usize> {
        self.cells.iter().find_map(ScoreEntry::arity)
    }

    /// Aggregate all columns of each row into a single column.
    ///
    /// `weights[r][c]` is the weight of the entry at `(r, c)`; the result
    /// has shape `(rows, 1)`.
    ///
    /// # Example
    /// ```
    /// use iomb::{DqiMatrix, ScoreEntry};
    ///
    /// let m = DqiMatrix::parse("[ (4,1,3) (2,1,5) ]").unwrap();
    /// let r = m.aggregate_columns(&[[0.4, 0.7]]).unwrap();
    /// assert_eq!(r.get(0, 0).unwrap(), &ScoreEntry::from([3, 1, 4]));
    /// ```
    pub fn aggregate_columns<W: AsRef<[f64]>>(&self, weights: &[W]) -> DqiResult<DqiMatrix> {
        let found_cols = weights
            .iter()
            .map(|w| w.as_ref().len())
            .find(|&len| len != self.cols)
            .unwrap_or(self.cols);
        if weights.len() != self.rows || found_cols != self.cols {
            return Err(DqiError::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                found_rows: weights.len(),
                found_cols,
            });
        }

        let cells = self
            .iter_rows()
            .zip(weights)
            .map(|(entries, w)| aggregate_entries(entries, w.as_ref()))
            .collect::<DqiResult<Vec<_>>>()?;

        Ok(Self {
            rows: self.rows,
            cols: 1,
            cells,
        })
    }
}

/// Literal form, parsable by [`DqiMatrix::parse`] when the matrix is not empty.
impl fmt::Display for DqiMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == 0 || self.cols == 0 {
            return write!(f, "[ ]");
        }
        write!(f, "[")?;
        for (r, row) in self.iter_rows().enumerate() {
            if r > 0 {
                write!(f, " ;\n ")?;
            }
            for cell in row {
                write!(f, " {}", cell)?;
            }
        }
        write!(f, " ]")
    }
}

impl From<DqiMatrix> for MatrixRepr {
    fn from(m: DqiMatrix) -> Self {
        let entries = m.iter_rows().map(<[ScoreEntry]>::to_vec).collect();
        Self {
            rows: m.rows,
            cols: m.cols,
            entries,
        }
    }
}

impl TryFrom<MatrixRepr> for DqiMatrix {
    type Error = DqiError;

    fn try_from(repr: MatrixRepr) -> Result<Self, Self::Error> {
        let found_cols = repr
            .entries
            .iter()
            .map(Vec::len)
            .find(|&len| len != repr.cols)
            .unwrap_or(repr.cols);
        if repr.entries.len() != repr.rows || found_cols != repr.cols {
            return Err(DqiError::ShapeMismatch {
                expected_rows: repr.rows,
                expected_cols: repr.cols,
                found_rows: repr.entries.len(),
                found_cols,
            });
        }
        Ok(Self {
            rows: repr.rows,
            cols: repr.cols,
            cells: repr.entries.into_iter().flatten().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices() {
        let mut m = DqiMatrix::new(3, 5);
        m.set(2, 4, [1, 2, 3, 4, 5]).unwrap();
        assert_eq!(m.get(2, 4).unwrap(), &ScoreEntry::from([1, 2, 3, 4, 5]));
        assert!(m.get(0, 0).unwrap().is_missing());

        m.set(2, 4, ScoreEntry::Missing).unwrap();
        assert!(m.get(2, 4).unwrap().is_missing());
    }

    #[test]
    fn test_out_of_range() {
        let mut m = DqiMatrix::new(2, 3);
        assert_eq!(
            m.get(2, 0),
            Err(DqiError::Index {
                row: 2,
                col: 0,
                rows: 2,
                cols: 3
            })
        );
        assert!(matches!(m.get(0, 3), Err(DqiError::Index { .. })));
        assert!(matches!(m.set(5, 5, [1]), Err(DqiError::Index { .. })));
        assert!(matches!(m.row(2), Err(DqiError::Index { .. })));

        let empty = DqiMatrix::new(0, 0);
        assert!(matches!(empty.get(0, 0), Err(DqiError::Index { .. })));
    }

    #[test]
    fn test_rand() {
        let m = DqiMatrix::rand(5, 10);
        assert_eq!(m.shape(), (5, 10));
        for row in 0..m.rows() {
            for col in 0..m.cols() {
                let scores = m.get(row, col).unwrap().as_scores().unwrap();
                assert_eq!(scores.len(), 5);
                assert!(scores.iter().all(|s| (1..=5).contains(s)));
            }
        }
    }

    #[test]
    fn test_sample_with_seed() {
        let options = SampleOptions {
            arity: 3,
            low: -2,
            high: 2,
            seed: Some(42),
        };
        let a = DqiMatrix::sample(4, 4, &options).unwrap();
        let b = DqiMatrix::sample(4, 4, &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.arity(), Some(3));
        for row in a.iter_rows() {
            for cell in row {
                assert!(cell.as_scores().unwrap().iter().all(|s| (-2..=2).contains(s)));
            }
        }
    }

    #[test]
    fn test_sample_invalid_range() {
        let options = SampleOptions {
            low: 5,
            high: 1,
            ..SampleOptions::default()
        };
        assert_eq!(
            DqiMatrix::sample(1, 1, &options),
            Err(DqiError::InvalidSampleRange { low: 5, high: 1 })
        );
    }

    #[test]
    fn test_aggregate_columns() {
        let t = "
            [ (4,1,3) (2,1,5) ;
              (4,5,3) (1,5,1) ;
              (2,1,5) (3,1,4) ]
        ";
        let m = DqiMatrix::parse(t).unwrap();
        let weights = [[0.4, 0.7], [0.1, 0.5], [0.9, 0.2]];
        let r = m.aggregate_columns(&weights).unwrap();
        assert_eq!(r.rows(), 3);
        assert_eq!(r.cols(), 1);
        assert_eq!(r.get(0, 0).unwrap(), &ScoreEntry::from([3, 1, 4]));
        assert_eq!(r.get(1, 0).unwrap(), &ScoreEntry::from([2, 5, 1]));
        assert_eq!(r.get(2, 0).unwrap(), &ScoreEntry::from([2, 1, 5]));

        // source untouched
        assert_eq!(m, DqiMatrix::parse(t).unwrap());
    }

    #[test]
    fn test_aggregate_columns_missing_row() {
        let m = DqiMatrix::parse("[ (none) (none) ; (1,1) (none) ]").unwrap();
        let weights = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let r = m.aggregate_columns(&weights).unwrap();
        assert!(r.get(0, 0).unwrap().is_missing());
        assert_eq!(r.get(1, 0).unwrap(), &ScoreEntry::from([1, 1]));
    }

    #[test]
    fn test_aggregate_columns_shape_mismatch() {
        let m = DqiMatrix::rand(2, 3);
        let result = m.aggregate_columns(&[[1.0, 1.0, 1.0]]);
        assert!(matches!(result, Err(DqiError::ShapeMismatch { found_rows: 1, .. })));

        let result = m.aggregate_columns(&[vec![1.0, 1.0, 1.0], vec![1.0]]);
        assert_eq!(
            result,
            Err(DqiError::ShapeMismatch {
                expected_rows: 2,
                expected_cols: 3,
                found_rows: 2,
                found_cols: 1,
            })
        );
    }

    #[test]
    fn test_display_roundtrip() {
        let m = DqiMatrix::parse("[ (1,2,4) (3,3,2) (4,2,2) ; (4,2,4) (none) (5,2,5) ]").unwrap();
        let text = m.to_string();
        assert_eq!(text, "[ (1,2,4) (3,3,2) (4,2,2) ;\n  (4,2,4) (none) (5,2,5) ]");
        assert_eq!(DqiMatrix::parse(&text).unwrap(), m);

        assert_eq!(DqiMatrix::new(0, 3).to_string(), "[ ]");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut m = DqiMatrix::new(2, 1);
        m.set(0, 0, [1, 2]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"rows":2,"cols":1,"entries":[[[1,2]],[null]]}"#);

        let parsed: DqiMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn test_json_shape_validated() {
        let json = r#"{"rows":2,"cols":1,"entries":[[[1,2]]]}"#;
        let result = serde_json::from_str::<DqiMatrix>(json);
        assert!(result.is_err());
    }
}
