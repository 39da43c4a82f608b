//! Goodness-of-fit scoring and best-fit selection.
//!
//! A candidate PDF is compared to the empirical density histogram of the
//! samples with a coefficient of determination:
//!
//! ```text
//! R² = 1 - SS_res / SS_tot
//! ```
//!
//! where `SS_res` sums squared differences between bucket density and the PDF
//! at the bucket midpoint, and `SS_tot` sums squared differences between bucket
//! density and the mean bucket density. Scores are clamped to `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::distribution::DistributionFamily;
use crate::stats::{histogram, DistributionParams};
use crate::MIN_SAMPLES;

/// Bucket count bounds for the fit histogram.
const MIN_FIT_BUCKETS: usize = 5;
const MAX_FIT_BUCKETS: usize = 20;

/// Score of one family against one sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitScore {
    pub family: DistributionFamily,
    /// R² in `[0, 1]`; higher is better.
    pub score: f64,
}

/// Goodness-of-fit of `family` to `samples`, in `[0, 1]`.
///
/// Returns 0.0 for fewer than [`MIN_SAMPLES`] samples, a zero-width range, or a
/// flat empirical histogram.
pub fn score_fit(samples: &[f64], params: &DistributionParams, family: DistributionFamily) -> f64 {
    let n = samples.len();
    if n < MIN_SAMPLES {
        return 0.0;
    }
    let range = params.range();
    if range.is_nan() || range <= 0.0 {
        return 0.0;
    }

    let bucket_count = ((n as f64).sqrt().floor() as usize).clamp(MIN_FIT_BUCKETS, MAX_FIT_BUCKETS);
    let width = range / bucket_count as f64;

    let density: Vec<f64> = histogram(samples, params.min, width, bucket_count)
        .into_iter()
        .map(|count| count as f64 / (n as f64 * width))
        .collect();
    let mean_density = density.iter().sum::<f64>() / bucket_count as f64;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &observed) in density.iter().enumerate() {
        let x = params.min + (i as f64 + 0.5) * width;
        let expected = family.pdf(params, x);
        ss_res += (observed - expected).powi(2);
        ss_tot += (observed - mean_density).powi(2);
    }

    if ss_tot == 0.0 {
        return 0.0;
    }
    let r2 = 1.0 - ss_res / ss_tot;
    if r2.is_finite() {
        r2.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// The family with the highest score.
///
/// Fewer than [`MIN_SAMPLES`] samples default to `Normal` without scoring.
/// Ties go to the family that comes first in [`DistributionFamily::ALL`].
pub fn select_best_fit(samples: &[f64], params: &DistributionParams) -> DistributionFamily {
    if samples.len() < MIN_SAMPLES {
        return DistributionFamily::Normal;
    }

    let mut best = DistributionFamily::Normal;
    let mut best_score = f64::NEG_INFINITY;
    for family in DistributionFamily::ALL {
        let score = score_fit(samples, params, family);
        if score > best_score {
            best_score = score;
            best = family;
        }
    }
    best
}

/// Scores for every family, best first. Equal scores keep evaluation order.
pub fn rank_fits(samples: &[f64], params: &DistributionParams) -> Vec<FitScore> {
    let mut scores: Vec<FitScore> = DistributionFamily::ALL
        .into_iter()
        .map(|family| FitScore {
            family,
            score: score_fit(samples, params, family),
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}
