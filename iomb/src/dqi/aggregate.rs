//! Weighted aggregation of quality scores.
//!
//! Averages are rounded half-to-even, so `2.5` becomes `2` and `3.5` becomes `4`.

use crate::error::{DqiError, DqiResult};
use crate::models::ScoreEntry;

/// Weighted average of `values`, rounded to the nearest integer.
///
/// Returns `0` for empty input.
///
/// # Example
/// ```
/// use iomb::weighted_avg;
///
/// assert_eq!(weighted_avg(&[5, 3, 2], &[0.3, 0.8, 0.1]).unwrap(), 3);
/// assert_eq!(weighted_avg(&[], &[]).unwrap(), 0);
/// ```
pub fn weighted_avg(values: &[i32], weights: &[f64]) -> DqiResult<i32> {
    if values.len() != weights.len() {
        return Err(DqiError::WeightCount {
            values: values.len(),
            weights: weights.len(),
        });
    }
    if values.is_empty() {
        return Ok(0);
    }

    check_weights(weights)?;
    let max = weights.iter().copied().fold(0.0, f64::max);
    if max == 0.0 {
        return Err(DqiError::Aggregation("total weight is zero".to_string()));
    }

    // Scaled into [0, 1] so that sums of large weights stay finite.
    let mut sum = 0.0;
    let mut total = 0.0;
    for (&v, &w) in values.iter().zip(weights) {
        let w = w / max;
        sum += f64::from(v) * w;
        total += w;
    }

    Ok((sum / total).round_ties_even() as i32)
}

fn check_weights(weights: &[f64]) -> DqiResult<()> {
    match weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        Some(w) => Err(DqiError::Aggregation(format!("invalid weight {}", w))),
        None => Ok(()),
    }
}

/// Component-wise weighted average of score tuples.
///
/// Missing entries are left out together with their weights. If every
/// entry is missing the result is missing. Weights are validated before
/// any entry is skipped, so a negative weight on a missing entry is still
/// an error.
pub fn aggregate_entries(entries: &[ScoreEntry], weights: &[f64]) -> DqiResult<ScoreEntry> {
    if entries.len() != weights.len() {
        return Err(DqiError::WeightCount {
            values: entries.len(),
            weights: weights.len(),
        });
    }
    check_weights(weights)?;

    let mut arity = None;
    let mut present: Vec<(&[i32], f64)> = Vec::with_capacity(entries.len());
    for (i, (entry, &w)) in entries.iter().zip(weights).enumerate() {
        let Some(scores) = entry.as_scores() else {
            continue;
        };
        match arity {
            None => arity = Some(scores.len()),
            Some(expected) if expected != scores.len() => {
                return Err(DqiError::ArityMismatch {
                    location: format!("entry {}", i),
                    expected,
                    found: scores.len(),
                });
            }
            Some(_) => {}
        }
        present.push((scores, w));
    }

    let Some(arity) = arity else {
        return Ok(ScoreEntry::Missing);
    };

    let kept: Vec<f64> = present.iter().map(|(_, w)| *w).collect();
    let mut result = Vec::with_capacity(arity);
    let mut values = Vec::with_capacity(present.len());
    for component in 0..arity {
        values.clear();
        values.extend(present.iter().map(|(scores, _)| scores[component]));
        result.push(weighted_avg(&values, &kept)?);
    }

    Ok(ScoreEntry::Present(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_avg() {
        assert_eq!(weighted_avg(&[], &[]).unwrap(), 0);
        assert_eq!(weighted_avg(&[5], &[0.3]).unwrap(), 5);
        assert_eq!(weighted_avg(&[5, 3, 2], &[0.3, 0.8, 0.1]).unwrap(), 3);
    }

    #[test]
    fn test_weighted_avg_rounds_half_to_even() {
        assert_eq!(weighted_avg(&[2, 3], &[1.0, 1.0]).unwrap(), 2);
        assert_eq!(weighted_avg(&[3, 4], &[1.0, 1.0]).unwrap(), 4);
        assert_eq!(weighted_avg(&[-2, -3], &[1.0, 1.0]).unwrap(), -2);
    }

    #[test]
    fn test_weighted_avg_zero_total_weight() {
        let result = weighted_avg(&[4, 2], &[0.0, 0.0]);
        assert!(matches!(result, Err(DqiError::Aggregation(_))));
    }

    #[test]
    fn test_weighted_avg_invalid_weights() {
        assert!(matches!(
            weighted_avg(&[4, 2], &[0.5, -0.1]),
            Err(DqiError::Aggregation(_))
        ));
        assert!(matches!(
            weighted_avg(&[4], &[f64::NAN]),
            Err(DqiError::Aggregation(_))
        ));
        assert_eq!(
            weighted_avg(&[4, 2], &[0.5]),
            Err(DqiError::WeightCount { values: 2, weights: 1 })
        );
    }

    #[test]
    fn test_weighted_avg_huge_weights() {
        assert_eq!(weighted_avg(&[5], &[1e308]).unwrap(), 5);
        assert_eq!(weighted_avg(&[5, 5], &[1e308, 1e308]).unwrap(), 5);
        assert_eq!(weighted_avg(&[1, 4], &[f64::MAX, f64::MAX / 2.0]).unwrap(), 2);
        assert_eq!(weighted_avg(&[-4, 2], &[f64::MAX, f64::MAX]).unwrap(), -1);
    }

    #[test]
    fn test_aggregate_entries() {
        let entries = vec![ScoreEntry::from([4, 1, 3]), ScoreEntry::from([2, 1, 5])];
        let agg = aggregate_entries(&entries, &[0.4, 0.7]).unwrap();
        assert_eq!(agg, ScoreEntry::from([3, 1, 4]));
    }

    #[test]
    fn test_aggregate_entries_skips_missing() {
        let entries = vec![
            ScoreEntry::from([1, 5]),
            ScoreEntry::Missing,
            ScoreEntry::from([4, 1]),
        ];
        // The missing entry carries most of the weight; it must not pull the average.
        let agg = aggregate_entries(&entries, &[1.0, 100.0, 3.0]).unwrap();
        assert_eq!(agg, ScoreEntry::from([3, 2]));
    }

    #[test]
    fn test_aggregate_entries_all_missing() {
        let entries = vec![ScoreEntry::Missing, ScoreEntry::Missing];
        assert_eq!(aggregate_entries(&entries, &[0.2, 0.8]).unwrap(), ScoreEntry::Missing);
        assert_eq!(aggregate_entries(&[], &[]).unwrap(), ScoreEntry::Missing);
    }

    #[test]
    fn test_aggregate_entries_arity_mismatch() {
        let entries = vec![ScoreEntry::from([1, 2, 3]), ScoreEntry::from([1, 2])];
        let result = aggregate_entries(&entries, &[0.5, 0.5]);
        assert!(matches!(
            result,
            Err(DqiError::ArityMismatch { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_aggregate_entries_huge_weights() {
        let entries = vec![ScoreEntry::from([4, 1]), ScoreEntry::from([2, 3])];
        let agg = aggregate_entries(&entries, &[1e308, 1e308]).unwrap();
        assert_eq!(agg, ScoreEntry::from([3, 2]));
    }

    #[test]
    fn test_aggregate_entries_rejects_bad_weight_on_missing() {
        let entries = vec![ScoreEntry::Missing, ScoreEntry::from([1])];
        assert!(matches!(
            aggregate_entries(&entries, &[-5.0, 1.0]),
            Err(DqiError::Aggregation(_))
        ));
        assert!(matches!(
            aggregate_entries(&entries, &[f64::INFINITY, 1.0]),
            Err(DqiError::Aggregation(_))
        ));
    }

    #[test]
    fn test_aggregate_entries_zero_weight_on_present() {
        let entries = vec![ScoreEntry::from([1]), ScoreEntry::Missing];
        let result = aggregate_entries(&entries, &[0.0, 1.0]);
        assert!(matches!(result, Err(DqiError::Aggregation(_))));
    }
}
