//! Bulk operations over many analysis units.
//!
//! A batch owns the units of one analysis and supports:
//! - "apply to all" adjustments, recomputed per unit on rayon's pool
//! - single-unit replacement after an edit
//! - filtered views (by asset, by metric, attention-only)
//! - summary counts for reporting
//!
//! Each unit's recompute depends on that unit alone, so parallel and serial
//! application produce identical batches in the same order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use fitlab_core::{AnalysisStatus, AnalysisUnit, DistributionChoice, FilterConfig, FilterPatch};

use crate::profiling::ProfileScope;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("no unit with id '{0}' in batch")]
    UnknownUnit(String),
}

/// One configuration applied to every unit in a batch.
///
/// Replaces each unit's filter configuration and distribution selection
/// wholesale; planning values and the ignore flag are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalAdjustment {
    #[serde(default)]
    pub distribution: DistributionChoice,
    #[serde(default)]
    pub filter: FilterConfig,
}

impl GlobalAdjustment {
    /// The adjusted copy of `unit`.
    pub fn apply_to(&self, unit: &AnalysisUnit) -> AnalysisUnit {
        unit.with_selected_distribution(self.distribution)
            .recompute_with_filter(&FilterPatch::replace_all(&self.filter))
    }
}

/// Selection criteria for [`AnalysisBatch::view`]. The default selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFilter {
    pub asset_id: Option<String>,
    pub metric_id: Option<String>,
    /// Only units whose status is `Warning` or `Error`.
    pub attention_only: bool,
}

impl BatchFilter {
    pub fn matches(&self, unit: &AnalysisUnit) -> bool {
        self.asset_id.as_deref().map_or(true, |a| unit.key.asset_id == a)
            && self.metric_id.as_deref().map_or(true, |m| unit.key.metric_id == m)
            && (!self.attention_only || unit.status.needs_attention())
    }
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub units: usize,
    pub ok: usize,
    pub warning: usize,
    pub error: usize,
    pub ignored: usize,
    /// Best-fit family counts over units with enough data to score.
    pub best_fits: BTreeMap<String, usize>,
}

/// The units of one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisBatch {
    units: Vec<AnalysisUnit>,
    parallel: bool,
}

impl AnalysisBatch {
    pub fn new(units: Vec<AnalysisUnit>) -> Self {
        Self {
            units,
            parallel: true,
        }
    }

    /// Enables or disables parallel recomputation.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn units(&self) -> &[AnalysisUnit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<AnalysisUnit> {
        self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AnalysisUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Swap in an edited unit with the same id. Returns the previous version.
    pub fn replace(&mut self, unit: AnalysisUnit) -> Result<AnalysisUnit, BatchError> {
        let slot = self
            .units
            .iter_mut()
            .find(|u| u.id == unit.id)
            .ok_or_else(|| BatchError::UnknownUnit(unit.id.clone()))?;
        Ok(std::mem::replace(slot, unit))
    }

    /// Apply `adjustment` to every unit. Unit order is preserved.
    pub fn apply_global(&self, adjustment: &GlobalAdjustment) -> AnalysisBatch {
        let _scope = ProfileScope::new("apply_global");

        let units: Vec<AnalysisUnit> = if self.parallel {
            self.units.par_iter().map(|u| adjustment.apply_to(u)).collect()
        } else {
            self.units.iter().map(|u| adjustment.apply_to(u)).collect()
        };

        let batch = AnalysisBatch {
            units,
            parallel: self.parallel,
        };
        tracing::info!(
            units = batch.len(),
            distribution = %adjustment.distribution,
            sigma = u8::from(adjustment.filter.sigma_filter),
            trim_bottom_pct = adjustment.filter.trim_bottom_pct,
            trim_top_pct = adjustment.filter.trim_top_pct,
            attention = batch.attention_count(),
            "applied global adjustment"
        );
        batch
    }

    /// Units matching `filter`, in batch order.
    pub fn view<'a>(
        &'a self,
        filter: &'a BatchFilter,
    ) -> impl Iterator<Item = &'a AnalysisUnit> + 'a {
        self.units.iter().filter(move |u| filter.matches(u))
    }

    /// Units with status `Warning` or `Error`.
    pub fn attention_count(&self) -> usize {
        self.units.iter().filter(|u| u.status.needs_attention()).count()
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            units: self.units.len(),
            ..BatchSummary::default()
        };
        for unit in &self.units {
            match unit.status.status {
                AnalysisStatus::Ok => summary.ok += 1,
                AnalysisStatus::Warning => summary.warning += 1,
                AnalysisStatus::Error => summary.error += 1,
            }
            if unit.ignored {
                summary.ignored += 1;
            }
            if unit.filtered_history.len() >= fitlab_core::MIN_SAMPLES {
                *summary.best_fits.entry(unit.best_fit.name().to_string()).or_default() += 1;
            }
        }
        summary
    }
}
