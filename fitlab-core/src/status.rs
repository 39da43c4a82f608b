//! Advisory health status for an analysis unit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stats::DistributionParams;
use crate::MIN_SAMPLES;

/// Plan deviation threshold, in standard deviations.
pub const PLAN_DEVIATION_SIGMAS: f64 = 1.5;

/// Coefficient-of-variation threshold for the high-variance warning.
pub const MAX_RELATIVE_SPREAD: f64 = 0.4;

pub const MSG_INSUFFICIENT_DATA: &str = "insufficient data";
pub const MSG_PLAN_DEVIATION: &str = "plan deviation exceeds 1.5 standard deviations";
pub const MSG_HIGH_VARIANCE: &str = "variance exceeds 40% of mean";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisStatus {
    #[default]
    Ok,
    Warning,
    Error,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Error => "Error",
        })
    }
}

/// Status plus an optional explanation. Data, never a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusReport {
    pub fn ok() -> Self {
        Self::default()
    }

    fn with(status: AnalysisStatus, message: &str) -> Self {
        Self {
            status,
            message: Some(message.to_string()),
        }
    }

    /// True for `Warning` and `Error`.
    pub fn needs_attention(&self) -> bool {
        !matches!(self.status, AnalysisStatus::Ok)
    }
}

/// Classify a unit's fitted distribution against its planned P50.
///
/// Checks, first match wins:
/// 1. fewer than [`MIN_SAMPLES`] samples → `Error`
/// 2. `|mean - p50| > 1.5·std_dev` → `Warning`
/// 3. `mean != 0` and `std_dev > 0.4·|mean|` → `Warning`
pub fn evaluate_status(params: &DistributionParams, p50: f64, sample_count: usize) -> StatusReport {
    if sample_count < MIN_SAMPLES {
        return StatusReport::with(AnalysisStatus::Error, MSG_INSUFFICIENT_DATA);
    }

    let deviation = (params.mean - p50).abs();
    if deviation > PLAN_DEVIATION_SIGMAS * params.std_dev {
        return StatusReport::with(AnalysisStatus::Warning, MSG_PLAN_DEVIATION);
    }

    if params.mean != 0.0 && params.std_dev > MAX_RELATIVE_SPREAD * params.mean.abs() {
        return StatusReport::with(AnalysisStatus::Warning, MSG_HIGH_VARIANCE);
    }

    StatusReport::ok()
}
