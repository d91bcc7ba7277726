//! Trend slopes over daily buckets: a simple least-squares fit of success
//! rate and average run duration against day index. Grounded on
//! `src/services/metrics/research_metrics.py`'s trend computation.

use chrono::{Duration, NaiveDate};
use research_contracts::{ResearchRun, RunStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct TrendSlopes {
    pub success_rate_slope: f64,
    pub avg_duration_slope: f64,
}

/// Ordinary least-squares slope of `y` against its index, i.e. against
/// evenly spaced `x = 0, 1, 2, ...`. Returns `0.0` for fewer than two points
/// or a degenerate (zero-variance) `x` series.
pub fn least_squares_slope(points: &[f64]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean: f64 = points.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in points.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

struct DayBucket {
    total: u64,
    completed: u64,
    total_duration: Duration,
    duration_samples: u64,
}

impl Default for DayBucket {
    fn default() -> Self {
        Self { total: 0, completed: 0, total_duration: Duration::zero(), duration_samples: 0 }
    }
}

/// Buckets `runs` by the UTC calendar day of `created_at`, then fits a
/// slope over the resulting per-day success rate and average duration
/// series, in chronological order.
pub fn daily_trend(runs: &[ResearchRun]) -> TrendSlopes {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for run in runs {
        let bucket = buckets.entry(run.created_at.date_naive()).or_default();
        bucket.total += 1;
        if run.status == RunStatus::Completed {
            bucket.completed += 1;
        }
        if let (Some(started), Some(completed)) = (run.started_at, run.completed_at) {
            bucket.total_duration = bucket.total_duration + (completed - started);
            bucket.duration_samples += 1;
        }
    }

    let success_rates: Vec<f64> = buckets.values().map(|b| b.completed as f64 / b.total as f64).collect();
    let avg_durations: Vec<f64> = buckets
        .values()
        .filter(|b| b.duration_samples > 0)
        .map(|b| b.total_duration.num_milliseconds() as f64 / b.duration_samples as f64)
        .collect();

    TrendSlopes {
        success_rate_slope: least_squares_slope(&success_rates),
        avg_duration_slope: least_squares_slope(&avg_durations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_has_zero_slope() {
        assert_eq!(least_squares_slope(&[0.5, 0.5, 0.5]), 0.0);
    }

    #[test]
    fn monotonically_increasing_series_has_positive_slope() {
        let slope = least_squares_slope(&[0.1, 0.3, 0.5, 0.7]);
        assert!(slope > 0.0);
    }

    #[test]
    fn fewer_than_two_points_has_zero_slope() {
        assert_eq!(least_squares_slope(&[0.9]), 0.0);
        assert_eq!(least_squares_slope(&[]), 0.0);
    }
}
