//! Domain models for DQI matrices.
//!
//! - [`ScoreEntry`] - one cell of a DQI matrix: a score tuple or missing
//! - [`PEDIGREE_ARITY`] - number of indicators in the standard pedigree scheme

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of indicators in the standard pedigree matrix: reliability,
/// completeness, temporal, geographical and further technological correlation.
pub const PEDIGREE_ARITY: usize = 5;

// =============================================================================
// Score Entry
// =============================================================================

/// A single quality assessment.
///
/// Serialized as a JSON array of integers, or `null` when missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<i32>>", into = "Option<Vec<i32>>")]
pub enum ScoreEntry {
    /// No assessment was made for this position.
    #[default]
    Missing,
    /// Ordered quality scores, one per indicator.
    Present(Vec<i32>),
}

impl ScoreEntry {
    /// Create a present entry from scores.
    pub fn scores(values: impl Into<Vec<i32>>) -> Self {
        ScoreEntry::Present(values.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ScoreEntry::Missing)
    }

    /// Get the scores if present.
    pub fn as_scores(&self) -> Option<&[i32]> {
        match self {
            ScoreEntry::Present(v) => Some(v),
            ScoreEntry::Missing => None,
        }
    }

    /// Number of scores, `None` when missing.
    pub fn arity(&self) -> Option<usize> {
        self.as_scores().map(<[i32]>::len)
    }
}

impl From<Vec<i32>> for ScoreEntry {
    fn from(values: Vec<i32>) -> Self {
        ScoreEntry::Present(values)
    }
}

impl<const N: usize> From<[i32; N]> for ScoreEntry {
    fn from(values: [i32; N]) -> Self {
        ScoreEntry::Present(values.to_vec())
    }
}

impl From<Option<Vec<i32>>> for ScoreEntry {
    fn from(value: Option<Vec<i32>>) -> Self {
        match value {
            Some(v) => ScoreEntry::Present(v),
            None => ScoreEntry::Missing,
        }
    }
}

impl From<ScoreEntry> for Option<Vec<i32>> {
    fn from(entry: ScoreEntry) -> Self {
        match entry {
            ScoreEntry::Present(v) => Some(v),
            ScoreEntry::Missing => None,
        }
    }
}

/// Literal cell form: `(1,2,3)` or `(none)`.
impl fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreEntry::Missing => write!(f, "(none)"),
            ScoreEntry::Present(values) => {
                write!(f, "(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
