//! Analysis unit: one asset/metric/month sample set and everything derived from it.
//!
//! A unit is a value: every operation returns an updated copy and leaves the
//! input untouched. Any change to the filter configuration re-runs the whole
//! pipeline (filter → statistics → best fit → status) so the derived fields
//! never drift apart.

use serde::{Deserialize, Serialize};

use crate::distribution::{DistributionChoice, DistributionFamily};
use crate::filter::{apply_filters, tag_exclusions, FilterConfig, FilterPatch, TaggedSample};
use crate::fit::{rank_fits, score_fit, select_best_fit, FitScore};
use crate::stats::{compute_distribution, DistributionParams};
use crate::status::{evaluate_status, StatusReport};

/// Identity of an analysis unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKey {
    pub asset_id: String,
    pub metric_id: String,
    /// Zero-based month within the planning horizon.
    pub month_index: u32,
    /// Display label for the month, e.g. "Jan 2024".
    pub label: String,
}

impl UnitKey {
    pub fn new(asset_id: &str, metric_id: &str, month_index: u32, label: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            metric_id: metric_id.to_string(),
            month_index,
            label: label.to_string(),
        }
    }

    /// Stable identifier: `{asset}-{metric}-{month}`.
    pub fn unit_id(&self) -> String {
        format!("{}-{}-{}", self.asset_id, self.metric_id, self.month_index)
    }
}

/// Caller-editable planning percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannedValues {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlannedField {
    P10,
    P50,
    P90,
}

/// One unit of analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisUnit {
    pub id: String,
    pub key: UnitKey,
    pub raw_history: Vec<f64>,
    /// Survivors of the filter pipeline, sorted ascending.
    pub filtered_history: Vec<f64>,
    pub filter_config: FilterConfig,
    pub distribution: DistributionParams,
    pub selected_distribution: DistributionChoice,
    pub best_fit: DistributionFamily,
    pub planned: PlannedValues,
    /// Excluded from downstream export.
    pub ignored: bool,
    pub status: StatusReport,
}

impl AnalysisUnit {
    /// Create a unit from raw samples. The initial filtered set is the raw set.
    pub fn new(key: UnitKey, raw_history: Vec<f64>, planned: PlannedValues) -> Self {
        // Raw order is kept; only non-finite samples are dropped.
        let filtered_history: Vec<f64> =
            raw_history.iter().copied().filter(|v| v.is_finite()).collect();
        let distribution = compute_distribution(&filtered_history);
        let best_fit = select_best_fit(&filtered_history, &distribution);
        let status = evaluate_status(&distribution, planned.p50, filtered_history.len());

        Self {
            id: key.unit_id(),
            key,
            filtered_history,
            raw_history,
            filter_config: FilterConfig::default(),
            distribution,
            selected_distribution: DistributionChoice::Auto,
            best_fit,
            planned,
            ignored: false,
            status,
        }
    }

    /// Merge `patch` onto the current filter configuration and re-run the pipeline.
    ///
    /// Planning values are kept; status is evaluated against the stored P50.
    pub fn recompute_with_filter(&self, patch: &FilterPatch) -> AnalysisUnit {
        let filter_config = self.filter_config.merge(patch);
        let filtered_history = apply_filters(&self.raw_history, &filter_config);
        let distribution = compute_distribution(&filtered_history);
        let best_fit = select_best_fit(&filtered_history, &distribution);
        let status = evaluate_status(&distribution, self.planned.p50, filtered_history.len());

        AnalysisUnit {
            filtered_history,
            filter_config,
            distribution,
            best_fit,
            status,
            ..self.clone()
        }
    }

    pub fn with_selected_distribution(&self, choice: DistributionChoice) -> AnalysisUnit {
        AnalysisUnit {
            selected_distribution: choice,
            ..self.clone()
        }
    }

    /// Set one planning value. NaN becomes 0.
    ///
    /// Status is refreshed because it depends on P50; filtered data and fit are untouched.
    pub fn with_planned_value(&self, field: PlannedField, value: f64) -> AnalysisUnit {
        let value = if value.is_nan() { 0.0 } else { value };
        let mut planned = self.planned;
        match field {
            PlannedField::P10 => planned.p10 = value,
            PlannedField::P50 => planned.p50 = value,
            PlannedField::P90 => planned.p90 = value,
        }
        let status = evaluate_status(&self.distribution, planned.p50, self.filtered_history.len());
        AnalysisUnit {
            planned,
            status,
            ..self.clone()
        }
    }

    pub fn with_ignored(&self, ignored: bool) -> AnalysisUnit {
        AnalysisUnit {
            ignored,
            ..self.clone()
        }
    }

    /// The family in use: the selected one, or the best fit under `Auto`.
    pub fn effective_family(&self) -> DistributionFamily {
        self.selected_distribution.resolve(self.best_fit)
    }

    /// Goodness of fit of the family in use.
    pub fn fit_score(&self) -> f64 {
        score_fit(&self.filtered_history, &self.distribution, self.effective_family())
    }

    /// Scores for every family against the filtered data, best first.
    pub fn fit_ranking(&self) -> Vec<FitScore> {
        rank_fits(&self.filtered_history, &self.distribution)
    }

    /// Raw samples tagged with the filter stage that excluded them.
    pub fn exclusions(&self) -> Vec<TaggedSample> {
        tag_exclusions(&self.raw_history, &self.filter_config)
    }
}
