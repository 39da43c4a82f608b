//! Analysis plan: which units to analyze and how to seed them.
//!
//! Plans are TOML files:
//!
//! ```toml
//! start = "2024-01-01"
//! months = 12
//! seed = 42
//!
//! [[assets]]
//! id = "truck-01"
//! name = "Haul Truck 01"
//!
//! [[metrics]]
//! id = "delay"
//! name = "Queue Delay"
//!
//! [global]
//! distribution = "Auto"
//!
//! [global.filter]
//! sigma_filter = 2
//! trim_top_pct = 5.0
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::batch::GlobalAdjustment;

/// Errors from loading or validating an analysis plan.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read plan file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse plan TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid plan: {0}")]
    Invalid(String),
}

/// A piece of equipment under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub id: String,
    pub name: String,
}

/// An operating metric. The name selects the synthetic baseline profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub id: String,
    pub name: String,
}

fn default_months() -> u32 {
    12
}

fn default_samples_per_unit() -> usize {
    50
}

fn default_seed() -> u64 {
    42
}

/// The full analysis plan: every asset × metric × month becomes one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPlan {
    pub assets: Vec<AssetSpec>,
    pub metrics: Vec<MetricSpec>,
    /// First planning month. Any day within the month is accepted.
    pub start: NaiveDate,
    #[serde(default = "default_months")]
    pub months: u32,
    #[serde(default = "default_samples_per_unit")]
    pub samples_per_unit: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Adjustment applied to every unit after synthesis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalAdjustment>,
}

impl AnalysisPlan {
    /// Load and validate a plan from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = Self::from_toml(&content)?;
        tracing::debug!(
            path = %path.display(),
            assets = plan.assets.len(),
            metrics = plan.metrics.len(),
            months = plan.months,
            "loaded analysis plan"
        );
        Ok(plan)
    }

    /// Parse and validate a plan from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let plan: Self = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::Invalid("no assets".into()));
        }
        if self.metrics.is_empty() {
            return Err(ConfigError::Invalid("no metrics".into()));
        }
        if self.months == 0 {
            return Err(ConfigError::Invalid("months must be at least 1".into()));
        }
        if let Some(dup) = first_duplicate(self.assets.iter().map(|a| a.id.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate asset id '{dup}'")));
        }
        if let Some(dup) = first_duplicate(self.metrics.iter().map(|m| m.id.as_str())) {
            return Err(ConfigError::Invalid(format!("duplicate metric id '{dup}'")));
        }
        if let Some(global) = &self.global {
            global
                .filter
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("global filter: {e}")))?;
        }
        Ok(())
    }

    /// The start date moved to the first of its month.
    pub fn start_month(&self) -> NaiveDate {
        self.start.with_day(1).unwrap_or(self.start)
    }

    /// Number of analysis units the plan describes.
    pub fn unit_count(&self) -> usize {
        self.assets.len() * self.metrics.len() * self.months as usize
    }
}

fn first_duplicate<'a>(mut ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = std::collections::HashSet::new();
    ids.find(|id| !seen.insert(*id))
}
