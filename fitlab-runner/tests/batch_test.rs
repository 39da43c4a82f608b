//! Plan file → synthetic batch → global adjustment, end to end.

use std::io::Write;

use fitlab_core::{AnalysisStatus, DistributionChoice, FilterConfig, SigmaFilter};
use fitlab_runner::{
    generate_units, AnalysisBatch, AnalysisPlan, BatchFilter, ConfigError, GlobalAdjustment,
};
use proptest::prelude::*;

const PLAN: &str = r#"
start = "2024-01-01"
months = 6
samples_per_unit = 50
seed = 7

[[assets]]
id = "truck-01"
name = "Haul Truck 01"

[[assets]]
id = "shovel-02"
name = "Electric Shovel 02"

[[metrics]]
id = "queue"
name = "Queue Delay"

[[metrics]]
id = "avail"
name = "Mechanical Availability"

[[metrics]]
id = "payload"
name = "Payload"

[global]
distribution = "Auto"

[global.filter]
sigma_filter = 3
trim_bottom_pct = 2.0
trim_top_pct = 2.0
absolute_min = 0.0
"#;

fn write_plan(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("plan.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn plan_file_round_trip_to_adjusted_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plan(&dir, PLAN);

    let plan = AnalysisPlan::from_file(&path).unwrap();
    assert_eq!(plan.unit_count(), 2 * 3 * 6);

    let batch = AnalysisBatch::new(generate_units(&plan));
    assert_eq!(batch.len(), 36);

    let global = plan.global.clone().unwrap();
    let adjusted = batch.apply_global(&global);
    assert_eq!(adjusted.len(), 36);
    for (before, after) in batch.units().iter().zip(adjusted.units()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.raw_history, after.raw_history);
        assert_eq!(before.planned, after.planned);
        assert_eq!(after.filter_config, global.filter);
        assert_eq!(after.selected_distribution, DistributionChoice::Auto);
        assert!(after.filtered_history.len() <= after.raw_history.len());
        assert!(after.filtered_history.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn invalid_plan_file_reports_the_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plan(&dir, &PLAN.replace("months = 6", "months = 0"));
    let err = AnalysisPlan::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

    let path = write_plan(&dir, "start = ");
    assert!(matches!(AnalysisPlan::from_file(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn empty_histories_are_errors_and_show_in_attention_view() {
    let plan = AnalysisPlan::from_toml(PLAN).unwrap();
    let batch = AnalysisBatch::new(generate_units(&plan));

    for unit in batch.units().iter().filter(|u| u.raw_history.is_empty()) {
        assert_eq!(unit.status.status, AnalysisStatus::Error);
    }
    let attention = BatchFilter {
        attention_only: true,
        ..BatchFilter::default()
    };
    assert_eq!(batch.view(&attention).count(), batch.attention_count());

    let summary = batch.summary();
    assert_eq!(summary.units, 36);
    assert_eq!(summary.ok + summary.warning + summary.error, 36);
    assert_eq!(summary.warning + summary.error, batch.attention_count());
}

#[test]
fn sigma_filter_reduces_outlier_count() {
    let plan = AnalysisPlan::from_toml(PLAN).unwrap();
    let batch = AnalysisBatch::new(generate_units(&plan));
    let adjusted = batch.apply_global(&GlobalAdjustment {
        distribution: DistributionChoice::Auto,
        filter: FilterConfig {
            sigma_filter: SigmaFilter::Two,
            ..FilterConfig::default()
        },
    });

    let raw: usize = batch.units().iter().map(|u| u.raw_history.len()).sum();
    let kept: usize = adjusted.units().iter().map(|u| u.filtered_history.len()).sum();
    assert!(kept < raw, "kept {kept} of {raw}");
}

#[test]
fn synthesis_is_independent_of_thread_count() {
    let plan = AnalysisPlan::from_toml(PLAN).unwrap();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let single = pool.install(|| generate_units(&plan));
    assert_eq!(single, generate_units(&plan));
}

// ── Order independence (proptest) ───────────────────────────────────

fn arb_adjustment() -> impl Strategy<Value = GlobalAdjustment> {
    (
        0.0..=25.0_f64,
        0.0..=25.0_f64,
        prop_oneof![
            Just(SigmaFilter::Off),
            Just(SigmaFilter::Two),
            Just(SigmaFilter::Three)
        ],
        prop::option::of(0.0..50.0_f64),
    )
        .prop_map(|(bottom, top, sigma, min)| GlobalAdjustment {
            distribution: DistributionChoice::Auto,
            filter: FilterConfig {
                trim_bottom_pct: bottom,
                trim_top_pct: top,
                sigma_filter: sigma,
                absolute_min: min,
                absolute_max: None,
            },
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Parallel, serial, and reversed-order application agree unit for unit.
    #[test]
    fn apply_global_is_order_independent(adjustment in arb_adjustment(), seed in 0u64..1000) {
        let mut plan = AnalysisPlan::from_toml(PLAN).unwrap();
        plan.seed = seed;
        plan.months = 2;
        let units = generate_units(&plan);

        let parallel = AnalysisBatch::new(units.clone()).apply_global(&adjustment);
        let serial = AnalysisBatch::new(units.clone())
            .with_parallelism(false)
            .apply_global(&adjustment);

        let mut reversed_units = units;
        reversed_units.reverse();
        let mut reversed = AnalysisBatch::new(reversed_units)
            .with_parallelism(false)
            .apply_global(&adjustment)
            .into_units();
        reversed.reverse();

        prop_assert_eq!(parallel.units(), serial.units());
        prop_assert_eq!(parallel.units(), reversed.as_slice());
    }
}
