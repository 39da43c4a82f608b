//! End-to-end checks of the filter → statistics → fit → status pipeline.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fitlab_core::{
    apply_filters, compute_distribution, score_fit, select_best_fit, AnalysisStatus,
    AnalysisUnit, DistributionFamily, DistributionParams, ExclusionReason, FilterConfig,
    FilterPatch, PlannedValues, SigmaFilter, UnitKey,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn normal_samples(rng: &mut StdRng, n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
            let u2: f64 = rng.gen();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            mean + z * std_dev
        })
        .collect()
}

fn unit(samples: Vec<f64>, p50: f64) -> AnalysisUnit {
    AnalysisUnit::new(
        UnitKey::new("dragline-2", "breakdown", 0, "Jan 2024"),
        samples,
        PlannedValues {
            p10: p50 * 0.9,
            p50,
            p90: p50 * 1.1,
        },
    )
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

// ── Properties ───────────────────────────────────────────────────────

#[test]
fn empty_distribution_is_all_zero() {
    assert_eq!(
        compute_distribution(&[]),
        DistributionParams {
            min: 0.0,
            mode: 0.0,
            max: 0.0,
            mean: 0.0,
            std_dev: 0.0,
        }
    );
}

#[test]
fn noop_filter_is_identity() {
    let mut rng = StdRng::seed_from_u64(11);
    let raw = normal_samples(&mut rng, 60, 30.0, 10.0);
    let u = unit(raw.clone(), 30.0).recompute_with_filter(&FilterPatch::replace_all(
        &FilterConfig {
            trim_bottom_pct: 0.0,
            trim_top_pct: 0.0,
            sigma_filter: SigmaFilter::Off,
            absolute_min: None,
            absolute_max: None,
        },
    ));

    assert_eq!(sorted(&u.filtered_history), sorted(&raw));
    let expected = compute_distribution(&raw);
    assert_eq!(u.distribution.min, expected.min);
    assert_eq!(u.distribution.max, expected.max);
    assert_eq!(u.distribution.mode, expected.mode);
    assert!((u.distribution.mean - expected.mean).abs() < 1e-9);
    assert!((u.distribution.std_dev - expected.std_dev).abs() < 1e-9);
}

#[test]
fn three_sigma_removes_injected_outliers() {
    let mut rng = StdRng::seed_from_u64(2024);
    let core = normal_samples(&mut rng, 1000, 100.0, 10.0);
    let mut raw = core.clone();
    raw.extend([1000.0; 5]);

    let config = FilterConfig {
        sigma_filter: SigmaFilter::Three,
        ..FilterConfig::default()
    };
    let out = apply_filters(&raw, &config);

    assert!(out.iter().all(|&v| v < 1000.0));
    let kept_core = out.len() as f64;
    assert!(
        (kept_core - 1000.0).abs() <= 10.0,
        "kept {kept_core} of 1000 core samples"
    );
}

#[test]
fn tail_trim_on_one_to_hundred() {
    let raw: Vec<f64> = (1..=100).map(|v| v as f64).collect();
    let config = FilterConfig {
        trim_bottom_pct: 10.0,
        trim_top_pct: 10.0,
        ..FilterConfig::default()
    };
    let out = apply_filters(&raw, &config);
    assert_eq!(out.len(), 80);
    assert_eq!(out, (11..=90).map(|v| v as f64).collect::<Vec<_>>());
}

#[test]
fn end_to_end_outlier_example() {
    let raw = vec![10.0, 12.0, 11.0, 13.0, 9.0, 10.0, 11.0, 12.0, 10.0, 50.0];
    let u = unit(raw, 11.0).recompute_with_filter(&FilterPatch::sigma(SigmaFilter::Two));

    assert!(!u.filtered_history.contains(&50.0));
    assert!((u.distribution.mean - 11.0).abs() < 0.2);
    assert_eq!(u.status.status, AnalysisStatus::Ok);
    assert!(u.status.message.is_none());
}

#[test]
fn absolute_bounds_remove_exactly_out_of_range_values() {
    let raw = vec![-3.0, 5.0, 40.0, 100.0, 101.0, 0.0, 250.0, 60.0, -0.5, 99.9];
    let config = FilterConfig {
        trim_bottom_pct: 0.0,
        trim_top_pct: 0.0,
        sigma_filter: SigmaFilter::Off,
        absolute_min: Some(0.0),
        absolute_max: Some(100.0),
    };
    let out = apply_filters(&raw, &config);
    assert_eq!(out, vec![0.0, 5.0, 40.0, 60.0, 99.9, 100.0]);

    let u = unit(raw, 50.0).recompute_with_filter(&FilterPatch::replace_all(&config));
    let limits: Vec<f64> = u
        .exclusions()
        .into_iter()
        .filter(|t| t.reason == Some(ExclusionReason::Limit))
        .map(|t| t.value)
        .collect();
    assert_eq!(limits, vec![-3.0, 101.0, 250.0, -0.5]);
}

#[test]
fn bounds_apply_before_sigma_and_trim() {
    // With bounds applied first, the 1e6 spike never reaches the sigma stage.
    let mut rng = StdRng::seed_from_u64(5);
    let mut raw = normal_samples(&mut rng, 200, 50.0, 5.0);
    raw.push(-10.0);
    raw.push(1e6);
    let config = FilterConfig {
        trim_bottom_pct: 5.0,
        trim_top_pct: 5.0,
        sigma_filter: SigmaFilter::Three,
        absolute_min: Some(0.0),
        absolute_max: Some(100.0),
    };
    let out = apply_filters(&raw, &config);
    assert!(out.iter().all(|&v| (0.0..=100.0).contains(&v)));

    let tagged = fitlab_core::tag_exclusions(&raw, &config);
    let limit_count = tagged
        .iter()
        .filter(|t| t.reason == Some(ExclusionReason::Limit))
        .count();
    assert_eq!(limit_count, 2);
}

#[test]
fn best_fit_has_the_highest_score() {
    let mut rng = StdRng::seed_from_u64(99);
    let samples = normal_samples(&mut rng, 500, 40.0, 4.0);
    let params = compute_distribution(&samples);
    let best = select_best_fit(&samples, &params);
    let best_score = score_fit(&samples, &params, best);
    for family in DistributionFamily::ALL {
        assert!(score_fit(&samples, &params, family) <= best_score);
    }
}

#[test]
fn normal_data_prefers_normal_over_triangular() {
    let mut rng = StdRng::seed_from_u64(314);
    let samples = normal_samples(&mut rng, 2000, 100.0, 10.0);
    let params = compute_distribution(&samples);
    let normal = score_fit(&samples, &params, DistributionFamily::Normal);
    let triangular = score_fit(&samples, &params, DistributionFamily::Triangular);
    assert!(normal > triangular, "normal {normal} vs triangular {triangular}");
}

#[test]
fn skewed_data_prefers_lognormal_over_normal() {
    let mut rng = StdRng::seed_from_u64(77);
    let samples: Vec<f64> = normal_samples(&mut rng, 2000, 0.0, 1.0)
        .into_iter()
        .map(|z| (30.0_f64.ln() + 0.6 * z).exp())
        .collect();
    let params = compute_distribution(&samples);
    let normal = score_fit(&samples, &params, DistributionFamily::Normal);
    let lognormal = score_fit(&samples, &params, DistributionFamily::LogNormal);
    assert!(lognormal > normal, "lognormal {lognormal} vs normal {normal}");
}

#[test]
fn recompute_is_independent_of_history() {
    // Reaching the same filter config through different patch sequences gives the same unit.
    let mut rng = StdRng::seed_from_u64(8);
    let base = unit(normal_samples(&mut rng, 80, 20.0, 3.0), 20.0);

    let a = base
        .recompute_with_filter(&FilterPatch::trim(5.0, 5.0))
        .recompute_with_filter(&FilterPatch::sigma(SigmaFilter::Two));
    let b = base
        .recompute_with_filter(&FilterPatch::sigma(SigmaFilter::Three))
        .recompute_with_filter(&FilterPatch::sigma(SigmaFilter::Two))
        .recompute_with_filter(&FilterPatch::trim(5.0, 5.0));

    assert_eq!(a.filter_config, b.filter_config);
    assert_eq!(a.filtered_history, b.filtered_history);
    assert_eq!(a.distribution, b.distribution);
    assert_eq!(a.best_fit, b.best_fit);
    assert_eq!(a.status, b.status);
}
