//! FitLab Core: statistics, outlier filtering, and distribution fitting.
//!
//! This crate turns a noisy sample of historical observations into the
//! parameters of a probability distribution suitable for Monte Carlo input:
//! - Descriptive statistics (min, histogram mode, max, mean, population std dev)
//! - Fixed-order outlier pipeline (absolute bounds → sigma clipping → tail trimming)
//! - Five closed-form distribution families (Normal, LogNormal, Triangular, PERT, Weibull)
//! - Histogram-based R² goodness-of-fit scoring and best-fit selection
//! - Advisory health status against a planned P50
//! - The analysis unit lifecycle tying the stages together
//!
//! Every entry point is a pure function of its inputs. Degenerate numeric input
//! (empty samples, zero range, zero spread) produces sentinel values, never errors.

pub mod distribution;
pub mod filter;
pub mod fit;
pub mod stats;
pub mod status;
pub mod unit;

pub use distribution::{DistributionChoice, DistributionFamily};
pub use filter::{
    apply_filters, tag_exclusions, ExclusionReason, ExclusionSummary, FilterConfig,
    FilterConfigError, FilterPatch, SigmaFilter, TaggedSample,
};
pub use fit::{rank_fits, score_fit, select_best_fit, FitScore};
pub use stats::{compute_distribution, DistributionParams};
pub use status::{evaluate_status, AnalysisStatus, StatusReport};
pub use unit::{AnalysisUnit, PlannedField, PlannedValues, UnitKey};

/// Minimum number of samples for mode estimation, fit scoring, and a non-error status.
pub const MIN_SAMPLES: usize = 5;
