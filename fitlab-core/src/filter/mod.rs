//! Outlier filter pipeline.
//!
//! Three stages, always applied in this order, each operating on the survivors
//! of the previous one:
//! 1. Absolute bounds: drop values outside `[absolute_min, absolute_max]`
//! 2. Sigma clipping: drop values beyond `k` standard deviations of the survivors
//! 3. Tail trimming: drop a percentage of the sorted survivors from each end
//!
//! Each stage is a standalone `&[f64] -> Vec<f64>` function; `apply_filters`
//! sequences them. Raw samples are never mutated.

mod audit;

pub use audit::{tag_exclusions, ExclusionReason, ExclusionSummary, TaggedSample};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::compute_distribution;

/// Largest trim percentage accepted by [`FilterConfig::validate`].
pub const MAX_TRIM_PCT: f64 = 25.0;

/// Sigma clipping level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SigmaFilter {
    #[default]
    Off,
    Two,
    Three,
}

impl SigmaFilter {
    /// Number of standard deviations kept on each side of the mean (0 = off).
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Off => 0.0,
            Self::Two => 2.0,
            Self::Three => 3.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl TryFrom<u8> for SigmaFilter {
    type Error = FilterConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(FilterConfigError::UnsupportedSigma(other)),
        }
    }
}

impl From<SigmaFilter> for u8 {
    fn from(value: SigmaFilter) -> Self {
        match value {
            SigmaFilter::Off => 0,
            SigmaFilter::Two => 2,
            SigmaFilter::Three => 3,
        }
    }
}

/// Errors from strict filter validation.
///
/// The pipeline itself never fails; validation is opt-in for callers that
/// load configuration from outside (plan files, flags).
#[derive(Debug, Error, PartialEq)]
pub enum FilterConfigError {
    #[error("unsupported sigma filter {0} (expected 0, 2, or 3)")]
    UnsupportedSigma(u8),

    #[error("{side} trim {value}% is outside 0-25%")]
    TrimOutOfRange { side: &'static str, value: f64 },

    #[error("absolute min {min} exceeds absolute max {max}")]
    InvertedBounds { min: f64, max: f64 },
}

/// Outlier filter configuration for one analysis unit.
///
/// The default configuration filters nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Percentage of sorted survivors removed from the bottom (0–25).
    #[serde(default)]
    pub trim_bottom_pct: f64,
    /// Percentage of sorted survivors removed from the top (0–25).
    #[serde(default)]
    pub trim_top_pct: f64,
    #[serde(default)]
    pub sigma_filter: SigmaFilter,
    /// Lower hard bound. NaN is treated as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_min: Option<f64>,
    /// Upper hard bound. NaN is treated as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_max: Option<f64>,
}

impl FilterConfig {
    /// Overlay a partial configuration onto this one.
    pub fn merge(&self, patch: &FilterPatch) -> FilterConfig {
        FilterConfig {
            trim_bottom_pct: patch.trim_bottom_pct.unwrap_or(self.trim_bottom_pct),
            trim_top_pct: patch.trim_top_pct.unwrap_or(self.trim_top_pct),
            sigma_filter: patch.sigma_filter.unwrap_or(self.sigma_filter),
            absolute_min: patch.absolute_min.unwrap_or(self.absolute_min),
            absolute_max: patch.absolute_max.unwrap_or(self.absolute_max),
        }
    }

    /// Lower bound if set and not NaN.
    pub fn effective_min(&self) -> Option<f64> {
        self.absolute_min.filter(|v| !v.is_nan())
    }

    /// Upper bound if set and not NaN.
    pub fn effective_max(&self) -> Option<f64> {
        self.absolute_max.filter(|v| !v.is_nan())
    }

    /// True when applying this configuration cannot remove any finite sample.
    pub fn is_noop(&self) -> bool {
        !self.sigma_filter.is_enabled()
            && self.effective_min().is_none()
            && self.effective_max().is_none()
            && trims_nothing(self.trim_bottom_pct)
            && trims_nothing(self.trim_top_pct)
    }

    /// Strict validation for externally supplied configuration.
    pub fn validate(&self) -> Result<(), FilterConfigError> {
        for (side, value) in [("bottom", self.trim_bottom_pct), ("top", self.trim_top_pct)] {
            if !(0.0..=MAX_TRIM_PCT).contains(&value) {
                return Err(FilterConfigError::TrimOutOfRange { side, value });
            }
        }
        if let (Some(min), Some(max)) = (self.effective_min(), self.effective_max()) {
            if min > max {
                return Err(FilterConfigError::InvertedBounds { min, max });
            }
        }
        Ok(())
    }
}

/// Partial filter configuration, merged onto an existing [`FilterConfig`].
///
/// `None` leaves a field unchanged. The bounds are tri-state:
/// `Some(None)` clears the bound, `Some(Some(x))` sets it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterPatch {
    pub trim_bottom_pct: Option<f64>,
    pub trim_top_pct: Option<f64>,
    pub sigma_filter: Option<SigmaFilter>,
    pub absolute_min: Option<Option<f64>>,
    pub absolute_max: Option<Option<f64>>,
}

impl FilterPatch {
    /// A patch that overwrites every field with `config`.
    pub fn replace_all(config: &FilterConfig) -> Self {
        Self {
            trim_bottom_pct: Some(config.trim_bottom_pct),
            trim_top_pct: Some(config.trim_top_pct),
            sigma_filter: Some(config.sigma_filter),
            absolute_min: Some(config.absolute_min),
            absolute_max: Some(config.absolute_max),
        }
    }

    pub fn sigma(level: SigmaFilter) -> Self {
        Self {
            sigma_filter: Some(level),
            ..Self::default()
        }
    }

    pub fn trim(bottom_pct: f64, top_pct: f64) -> Self {
        Self {
            trim_bottom_pct: Some(bottom_pct),
            trim_top_pct: Some(top_pct),
            ..Self::default()
        }
    }

    pub fn bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            absolute_min: Some(min),
            absolute_max: Some(max),
            ..Self::default()
        }
    }
}

/// Run the full three-stage pipeline. Returns the survivors sorted ascending.
pub fn apply_filters(samples: &[f64], config: &FilterConfig) -> Vec<f64> {
    let bounded = apply_absolute_bounds(samples, config.effective_min(), config.effective_max());
    let clipped = apply_sigma_clip(&bounded, config.sigma_filter);
    apply_tail_trim(&clipped, config.trim_bottom_pct, config.trim_top_pct)
}

/// Stage 1: drop non-finite values and values below `min` or above `max`.
pub fn apply_absolute_bounds(samples: &[f64], min: Option<f64>, max: Option<f64>) -> Vec<f64> {
    samples
        .iter()
        .copied()
        .filter(|&v| within_bounds(v, min, max))
        .collect()
}

/// Stage 2: drop values outside `mean ± k·std_dev` of the given set.
///
/// Needs more than two samples; smaller sets pass through unchanged.
pub fn apply_sigma_clip(samples: &[f64], level: SigmaFilter) -> Vec<f64> {
    match sigma_window(samples, level) {
        Some((lower, upper)) => samples
            .iter()
            .copied()
            .filter(|&v| v >= lower && v <= upper)
            .collect(),
        None => samples.to_vec(),
    }
}

/// Stage 3: sort ascending and drop `floor(N·pct/100)` values from each end.
///
/// If the two trims together would remove every sample, nothing is trimmed.
pub fn apply_tail_trim(samples: &[f64], bottom_pct: f64, top_pct: f64) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    match trim_counts(sorted.len(), bottom_pct, top_pct) {
        Some((bottom, top)) => sorted[bottom..sorted.len() - top].to_vec(),
        None => sorted,
    }
}

fn trims_nothing(pct: f64) -> bool {
    pct.is_nan() || pct <= 0.0
}

pub(crate) fn within_bounds(v: f64, min: Option<f64>, max: Option<f64>) -> bool {
    v.is_finite() && min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
}

/// Inclusive `(lower, upper)` window for sigma clipping, or `None` when the stage is a no-op.
pub(crate) fn sigma_window(samples: &[f64], level: SigmaFilter) -> Option<(f64, f64)> {
    if !level.is_enabled() || samples.len() <= 2 {
        return None;
    }
    let dist = compute_distribution(samples);
    let k = level.multiplier();
    Some((dist.mean - k * dist.std_dev, dist.mean + k * dist.std_dev))
}

/// `(bottom, top)` counts to trim from `n` sorted values, or `None` when the
/// trims would consume the whole set.
pub(crate) fn trim_counts(n: usize, bottom_pct: f64, top_pct: f64) -> Option<(usize, usize)> {
    if n == 0 {
        return None;
    }
    // Saturating casts: negative or NaN percentages trim nothing.
    let bottom = (n as f64 * (bottom_pct / 100.0)).floor() as usize;
    let top = (n as f64 * (top_pct / 100.0)).floor() as usize;
    if bottom.saturating_add(top) < n {
        Some((bottom, top))
    } else {
        None
    }
}
