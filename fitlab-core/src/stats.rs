//! Descriptive statistics: min, histogram mode, max, mean, population std dev.
//!
//! All functions are pure: samples in, scalars out. Empty input yields zeros.

use serde::{Deserialize, Serialize};

use crate::MIN_SAMPLES;

/// Distribution parameters derived from a (filtered) sample set.
///
/// `mean` and `std_dev` are the arithmetic mean and the population standard
/// deviation (divide by N). `mode` is the midpoint of the fullest histogram
/// bucket, so `min <= mode <= max` for every non-empty sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionParams {
    pub min: f64,
    pub mode: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistributionParams {
    /// Width of the observed range (`max - min`).
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Compute distribution parameters for a sample set.
///
/// Empty input returns all zeros. Fewer than [`MIN_SAMPLES`] values report the
/// mean as the mode, since a histogram peak on a handful of points is noise.
pub fn compute_distribution(samples: &[f64]) -> DistributionParams {
    if samples.is_empty() {
        return DistributionParams::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let mean = mean(samples);
    let std_dev = population_std_dev(samples);
    let mode = histogram_mode(&sorted, min, max, mean);

    DistributionParams {
        min,
        mode,
        max,
        mean,
        std_dev,
    }
}

/// Arithmetic mean. Returns 0.0 for empty input.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population standard deviation (divide by N). Returns 0.0 for empty input.
pub fn population_std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let m = mean(samples);
    let variance = samples.iter().map(|v| (v - m).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

/// Bucket for `value` in an equal-width histogram starting at `min`.
///
/// The index is clamped to `[0, bucket_count - 1]` so values sitting exactly on
/// the upper edge (or overshooting it through rounding) land in the last bucket.
pub fn bucket_index(value: f64, min: f64, width: f64, bucket_count: usize) -> usize {
    let raw = ((value - min) / width).floor();
    if raw <= 0.0 || raw.is_nan() {
        0
    } else {
        (raw as usize).min(bucket_count.saturating_sub(1))
    }
}

/// Count samples into `bucket_count` equal-width buckets starting at `min`.
pub(crate) fn histogram(samples: &[f64], min: f64, width: f64, bucket_count: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bucket_count];
    for &v in samples {
        counts[bucket_index(v, min, width, bucket_count)] += 1;
    }
    counts
}

fn histogram_mode(samples: &[f64], min: f64, max: f64, mean: f64) -> f64 {
    if samples.len() < MIN_SAMPLES {
        // Summation rounding can push the mean a hair past the extremes.
        return mean.max(min).min(max);
    }

    let bucket_count = ((samples.len() as f64).sqrt().floor() as usize).max(5);
    let range = max - min;
    let width = if range > 0.0 {
        range / bucket_count as f64
    } else {
        1.0
    };

    let counts = histogram(samples, min, width, bucket_count);

    // First fullest bucket wins ties.
    let mut peak = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[peak] {
            peak = i;
        }
    }

    let mode = min + peak as f64 * width + width / 2.0;
    mode.min(max)
}
