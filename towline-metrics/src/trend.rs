//! Duration trend summary statistics

use serde::{Deserialize, Serialize};

/// Summary statistics over a set of recorded duration samples (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrendSummary {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
}

impl TrendSummary {
    /// Compute summary statistics from raw samples
    pub fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let count = sorted.len() as u64;
        let sum: u64 = sorted.iter().sum();

        Self {
            count,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: sum as f64 / count as f64,
            p50: percentile(&sorted, 50.0),
            p90: percentile(&sorted, 90.0),
            p95: percentile(&sorted, 95.0),
        }
    }
}

/// Nearest-rank percentile over sorted samples
fn percentile(sorted: &[u64], pct: f64) -> u64 {
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples() {
        let summary = TrendSummary::from_samples(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, 0.0);
    }

    #[test]
    fn test_single_sample() {
        let summary = TrendSummary::from_samples(&[42]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.min, 42);
        assert_eq!(summary.max, 42);
        assert_eq!(summary.p95, 42);
    }

    #[test]
    fn test_percentiles_over_range() {
        let samples: Vec<u64> = (1..=100).collect();
        let summary = TrendSummary::from_samples(&samples);

        assert_eq!(summary.count, 100);
        assert_eq!(summary.min, 1);
        assert_eq!(summary.max, 100);
        assert_eq!(summary.mean, 50.5);
        assert_eq!(summary.p50, 50);
        assert_eq!(summary.p90, 90);
        assert_eq!(summary.p95, 95);
    }

    #[test]
    fn test_unsorted_input() {
        let summary = TrendSummary::from_samples(&[30, 10, 20]);
        assert_eq!(summary.min, 10);
        assert_eq!(summary.max, 30);
        assert_eq!(summary.p50, 20);
    }
}
