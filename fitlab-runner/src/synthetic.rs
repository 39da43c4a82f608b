//! Synthetic sample generation.
//!
//! Stands in for historical-data ingestion: every asset × metric × month of a
//! plan gets a deterministic, seeded sample set with realistic defects:
//! - empty histories (5% of units)
//! - inflated variance (10% of units, std dev ×3)
//! - right-skewed log-normal shapes (30% of units)
//! - injected outliers (5% of samples, ×2.5 or ×0.1)
//!
//! Each unit draws from its own RNG (see [`RngHierarchy`]), so output does not
//! depend on generation order and units are synthesized in parallel.

use chrono::{Months, NaiveDate};
use rand::Rng;
use rayon::prelude::*;

use fitlab_core::{compute_distribution, AnalysisUnit, PlannedValues, UnitKey};

use crate::config::{AnalysisPlan, AssetSpec, MetricSpec};
use crate::profiling::ProfileScope;
use crate::rng::RngHierarchy;

const EMPTY_HISTORY_RATE: f64 = 0.05;
const HIGH_VARIANCE_RATE: f64 = 0.10;
const HIGH_VARIANCE_FACTOR: f64 = 3.0;
const LOGNORMAL_RATE: f64 = 0.30;
const LOGNORMAL_SIGMA: f64 = 0.2;
const OUTLIER_RATE: f64 = 0.05;
const OUTLIER_HIGH: f64 = 2.5;
const OUTLIER_LOW: f64 = 0.1;
/// Planned P50 is drawn within ±20% of the sample mean.
const PLAN_JITTER: f64 = 0.2;

/// Baseline mean and spread of a metric's synthetic samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricProfile {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricProfile {
    /// Profile chosen from the metric name: delays and breakdowns are short
    /// durations, availability is a percentage, everything else is generic.
    pub fn for_metric(name: &str) -> Self {
        if name.contains("Delay") || name.contains("Break") {
            Self { mean: 30.0, std_dev: 10.0 }
        } else if name.contains("Availability") {
            Self { mean: 85.0, std_dev: 5.0 }
        } else {
            Self { mean: 100.0, std_dev: 15.0 }
        }
    }
}

/// Standard normal draw via Box–Muller.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen() is in [0, 1); shift u1 into (0, 1] so ln() stays finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// `"Jan 2024"`-style label for the month `offset` months after `start`.
pub fn month_label(start: NaiveDate, offset: u32) -> String {
    start
        .checked_add_months(Months::new(offset))
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Draw `count` samples around `profile`.
pub fn synthesize_samples<R: Rng + ?Sized>(
    rng: &mut R,
    profile: MetricProfile,
    count: usize,
    lognormal: bool,
) -> Vec<f64> {
    (0..count)
        .map(|_| {
            let z = standard_normal(rng);
            let mut v = if lognormal {
                (profile.mean.ln() + z * LOGNORMAL_SIGMA).exp()
            } else {
                profile.mean + z * profile.std_dev
            };
            if rng.gen_bool(OUTLIER_RATE) {
                v *= if rng.gen_bool(0.5) { OUTLIER_HIGH } else { OUTLIER_LOW };
            }
            round2(v.max(0.0))
        })
        .collect()
}

/// Synthesize one analysis unit.
pub fn synthesize_unit(
    plan: &AnalysisPlan,
    rngs: &RngHierarchy,
    asset: &AssetSpec,
    metric: &MetricSpec,
    month_index: u32,
) -> AnalysisUnit {
    let mut rng = rngs.rng_for(&asset.id, &metric.id, month_index);

    let empty = rng.gen_bool(EMPTY_HISTORY_RATE);
    let high_variance = rng.gen_bool(HIGH_VARIANCE_RATE);
    let lognormal = rng.gen_bool(LOGNORMAL_RATE);

    let mut profile = MetricProfile::for_metric(&metric.name);
    if high_variance {
        profile.std_dev *= HIGH_VARIANCE_FACTOR;
    }

    let count = if empty { 0 } else { plan.samples_per_unit };
    let samples = synthesize_samples(&mut rng, profile, count, lognormal);

    let jitter = rng.gen_range(-PLAN_JITTER..PLAN_JITTER);
    let planned = if samples.is_empty() {
        seed_planned_values(profile.mean, profile.std_dev)
    } else {
        let dist = compute_distribution(&samples);
        seed_planned_values(dist.mean * (1.0 + jitter), dist.std_dev)
    };

    let label = month_label(plan.start_month(), month_index);
    let key = UnitKey::new(&asset.id, &metric.id, month_index, &label);
    AnalysisUnit::new(key, samples, planned)
}

fn seed_planned_values(p50: f64, spread: f64) -> PlannedValues {
    PlannedValues {
        p10: round2(p50 - spread),
        p50: round2(p50),
        p90: round2(p50 + spread),
    }
}

/// Synthesize every unit of a plan, ordered asset → metric → month.
pub fn generate_units(plan: &AnalysisPlan) -> Vec<AnalysisUnit> {
    let _scope = ProfileScope::new("generate_units");
    let rngs = RngHierarchy::new(plan.seed);

    let keys: Vec<(&AssetSpec, &MetricSpec, u32)> = plan
        .assets
        .iter()
        .flat_map(move |asset| {
            plan.metrics
                .iter()
                .flat_map(move |metric| (0..plan.months).map(move |m| (asset, metric, m)))
        })
        .collect();

    let units: Vec<AnalysisUnit> = keys
        .par_iter()
        .map(|(asset, metric, month)| synthesize_unit(plan, &rngs, asset, metric, *month))
        .collect();

    tracing::info!(
        units = units.len(),
        seed = plan.seed,
        samples_per_unit = plan.samples_per_unit,
        "synthesized analysis units"
    );
    units
}
