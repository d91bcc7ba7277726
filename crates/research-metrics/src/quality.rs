//! Quality-score statistics: average, min, max, and a fixed-width histogram
//! over `QualityAssessment::overall` values. Grounded on
//! `src/services/metrics/research_metrics.py`'s quality summary.

const HISTOGRAM_BUCKETS: usize = 5;
const BUCKET_WIDTH: f64 = 1.0 / HISTOGRAM_BUCKETS as f64;

#[derive(Debug, Clone)]
pub struct QualityStatistics {
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Counts per `[i * 0.2, (i + 1) * 0.2)` bucket, `histogram[4]` closed
    /// on both ends to capture `overall == 1.0`.
    pub histogram: [u64; HISTOGRAM_BUCKETS],
}

impl Default for QualityStatistics {
    fn default() -> Self {
        Self { count: 0, avg: 0.0, min: 0.0, max: 0.0, histogram: [0; HISTOGRAM_BUCKETS] }
    }
}

impl QualityStatistics {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let count = scores.len() as u64;
        let sum: f64 = scores.iter().sum();
        let avg = sum / count as f64;
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let mut histogram = [0u64; HISTOGRAM_BUCKETS];
        for &score in scores {
            let bucket = ((score / BUCKET_WIDTH) as usize).min(HISTOGRAM_BUCKETS - 1);
            histogram[bucket] += 1;
        }

        Self { count, avg, min, max, histogram }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_zeroed_statistics() {
        let stats = QualityStatistics::from_scores(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.avg, 0.0);
    }

    #[test]
    fn computes_avg_min_max() {
        let stats = QualityStatistics::from_scores(&[0.2, 0.6, 1.0]);
        assert!((stats.avg - 0.6).abs() < 1e-9);
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 1.0);
    }

    #[test]
    fn a_perfect_score_lands_in_the_top_bucket() {
        let stats = QualityStatistics::from_scores(&[1.0]);
        assert_eq!(stats.histogram[HISTOGRAM_BUCKETS - 1], 1);
    }
}
