//! Exclusion audit: tags every raw sample with the stage that removed it.
//!
//! Mirrors `apply_filters` stage for stage: the same bounds, the same sigma
//! window (computed over the stage-1 survivors only), the same trim counts.
//! The values left untagged are exactly the pipeline output as a multiset.

use serde::{Deserialize, Serialize};

use super::{sigma_window, trim_counts, within_bounds, FilterConfig};

/// Why a sample was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// Outside the absolute bounds, or not a finite number.
    Limit,
    /// Outside the sigma clipping window.
    Sigma,
    /// Removed by tail trimming.
    Tail,
}

/// A raw sample with its position and exclusion status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedSample {
    /// Position in the raw sample sequence.
    pub index: usize,
    pub value: f64,
    /// `None` when the sample survives every stage.
    pub reason: Option<ExclusionReason>,
}

impl TaggedSample {
    pub fn is_excluded(&self) -> bool {
        self.reason.is_some()
    }
}

/// Per-reason exclusion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSummary {
    pub total: usize,
    pub kept: usize,
    pub limit: usize,
    pub sigma: usize,
    pub tail: usize,
}

impl ExclusionSummary {
    pub fn from_tagged(tagged: &[TaggedSample]) -> Self {
        let mut summary = Self {
            total: tagged.len(),
            ..Self::default()
        };
        for t in tagged {
            match t.reason {
                None => summary.kept += 1,
                Some(ExclusionReason::Limit) => summary.limit += 1,
                Some(ExclusionReason::Sigma) => summary.sigma += 1,
                Some(ExclusionReason::Tail) => summary.tail += 1,
            }
        }
        summary
    }

    pub fn excluded(&self) -> usize {
        self.total - self.kept
    }
}

/// Tag every raw sample with the first stage that excludes it.
///
/// Output is in raw order, one entry per raw sample.
pub fn tag_exclusions(raw: &[f64], config: &FilterConfig) -> Vec<TaggedSample> {
    let (min, max) = (config.effective_min(), config.effective_max());

    let mut tagged: Vec<TaggedSample> = raw
        .iter()
        .enumerate()
        .map(|(index, &value)| TaggedSample {
            index,
            value,
            reason: (!within_bounds(value, min, max)).then_some(ExclusionReason::Limit),
        })
        .collect();

    let survivors: Vec<f64> = kept_values(&tagged);
    if let Some((lower, upper)) = sigma_window(&survivors, config.sigma_filter) {
        for t in tagged.iter_mut().filter(|t| t.reason.is_none()) {
            if t.value < lower || t.value > upper {
                t.reason = Some(ExclusionReason::Sigma);
            }
        }
    }

    // Sort survivor positions by value; ties keep raw order.
    let mut order: Vec<usize> = tagged
        .iter()
        .filter(|t| t.reason.is_none())
        .map(|t| t.index)
        .collect();
    order.sort_by(|&a, &b| tagged[a].value.total_cmp(&tagged[b].value));

    if let Some((bottom, top)) = trim_counts(order.len(), config.trim_bottom_pct, config.trim_top_pct) {
        let n = order.len();
        for &idx in order[..bottom].iter().chain(&order[n - top..]) {
            tagged[idx].reason = Some(ExclusionReason::Tail);
        }
    }

    tagged
}

fn kept_values(tagged: &[TaggedSample]) -> Vec<f64> {
    tagged
        .iter()
        .filter(|t| t.reason.is_none())
        .map(|t| t.value)
        .collect()
}
