//! Data quality indicator (pedigree) matrices
//!
//! This module provides:
//! - `matrix`: the [`DqiMatrix`] container and random sampling
//! - `literal`: parser for the bracketed literal form
//! - `aggregate`: weighted aggregation of score tuples
//!
//! ## Example
//!
//! ```rust
//! use iomb::dqi::{DqiMatrix, ScoreEntry};
//!
//! let m = DqiMatrix::parse("
//!     [ (4,1,3) (2,1,5) ;
//!       (4,5,3) (1,5,1) ]
//! ").unwrap();
//!
//! let r = m.aggregate_columns(&[[0.4, 0.7], [0.1, 0.5]]).unwrap();
//! assert_eq!(r.shape(), (2, 1));
//! assert_eq!(r.get(1, 0).unwrap(), &ScoreEntry::from([2, 5, 1]));
//! ```

pub mod aggregate;
pub mod literal;
pub mod matrix;

pub use crate::models::ScoreEntry;
pub use aggregate::{aggregate_entries, weighted_avg};
pub use literal::{parse, ParseError};
pub use matrix::{DqiMatrix, SampleOptions};
