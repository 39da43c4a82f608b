//! FitLab CLI: fit distributions to samples and simulate analysis batches.
//!
//! Commands:
//! - `fit`: filter the given samples, fit all five families, report the best
//! - `simulate`: synthesize a batch from a TOML plan, apply its global
//!   adjustment, and report status counts and the units needing attention

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use fitlab_core::{
    AnalysisUnit, DistributionChoice, ExclusionSummary, FilterConfig, FilterPatch, PlannedField,
    PlannedValues, SigmaFilter, UnitKey,
};
use fitlab_runner::{generate_units, profiling, AnalysisBatch, AnalysisPlan, BatchFilter};

#[derive(Parser)]
#[command(
    name = "fitlab",
    about = "FitLab: outlier filtering and distribution fitting for Monte Carlo inputs"
)]
struct Cli {
    /// Log at debug level (otherwise RUST_LOG, default warn).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the five distribution families to samples given on the command line.
    Fit {
        /// Sample values.
        #[arg(required = true, allow_negative_numbers = true, value_parser = finite_f64)]
        values: Vec<f64>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Planned P50 to check the fit against. Defaults to the filtered mean.
        #[arg(long, allow_negative_numbers = true, value_parser = finite_f64)]
        p50: Option<f64>,

        /// Distribution to use: auto, normal, lognormal, triangular, pert, weibull.
        #[arg(long, default_value = "auto")]
        distribution: DistributionChoice,

        /// Print JSON instead of a text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Synthesize a batch from a plan file and report on it.
    Simulate {
        /// Path to a TOML analysis plan.
        #[arg(long)]
        config: PathBuf,

        /// Override the plan's seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Only list units for this asset id.
        #[arg(long)]
        asset: Option<String>,

        /// Only list units for this metric id.
        #[arg(long)]
        metric: Option<String>,

        /// Only list units with Warning or Error status.
        #[arg(long, default_value_t = false)]
        attention_only: bool,

        /// Print JSON instead of a text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Outlier filter flags shared by commands that filter samples.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Sigma clipping level: 0 (off), 2, or 3.
    #[arg(long, default_value_t = 0)]
    sigma: u8,

    /// Percent of sorted samples trimmed from the bottom (0-25).
    #[arg(long, default_value_t = 0.0)]
    trim_bottom: f64,

    /// Percent of sorted samples trimmed from the top (0-25).
    #[arg(long, default_value_t = 0.0)]
    trim_top: f64,

    /// Drop samples below this value.
    #[arg(long, allow_negative_numbers = true, value_parser = finite_f64)]
    min: Option<f64>,

    /// Drop samples above this value.
    #[arg(long, allow_negative_numbers = true, value_parser = finite_f64)]
    max: Option<f64>,
}

impl FilterArgs {
    fn to_config(&self) -> Result<FilterConfig> {
        let config = FilterConfig {
            trim_bottom_pct: self.trim_bottom,
            trim_top_pct: self.trim_top,
            sigma_filter: SigmaFilter::try_from(self.sigma)?,
            absolute_min: self.min,
            absolute_max: self.max,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse a number, rejecting NaN and infinities.
fn finite_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("'{s}' is not a finite number"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    profiling::init();

    match cli.command {
        Commands::Fit {
            values,
            filter,
            p50,
            distribution,
            json,
        } => run_fit(values, &filter, p50, distribution, json),
        Commands::Simulate {
            config,
            seed,
            asset,
            metric,
            attention_only,
            json,
        } => {
            let view = BatchFilter {
                asset_id: asset,
                metric_id: metric,
                attention_only,
            };
            run_simulate(&config, seed, &view, json)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build a unit from command-line samples and run the full pipeline on it.
fn fit_unit(
    values: Vec<f64>,
    config: &FilterConfig,
    p50: Option<f64>,
    distribution: DistributionChoice,
) -> AnalysisUnit {
    let unit = AnalysisUnit::new(
        UnitKey::new("cli", "samples", 0, ""),
        values,
        PlannedValues::default(),
    )
    .recompute_with_filter(&FilterPatch::replace_all(config))
    .with_selected_distribution(distribution);

    let target = p50.unwrap_or(unit.distribution.mean);
    unit.with_planned_value(PlannedField::P50, target)
}

fn run_fit(
    values: Vec<f64>,
    filter: &FilterArgs,
    p50: Option<f64>,
    distribution: DistributionChoice,
    json: bool,
) -> Result<()> {
    let config = filter.to_config().context("invalid filter flags")?;
    let unit = fit_unit(values, &config, p50, distribution);
    let exclusions = ExclusionSummary::from_tagged(&unit.exclusions());

    if json {
        let report = serde_json::json!({
            "unit": unit,
            "effective_distribution": unit.effective_family(),
            "fit_score": unit.fit_score(),
            "fit_ranking": unit.fit_ranking(),
            "exclusions": exclusions,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let d = &unit.distribution;
    println!();
    println!("=== Fit Result ===");
    println!(
        "Samples:        {} raw, {} kept ({} limit, {} sigma, {} tail)",
        exclusions.total, exclusions.kept, exclusions.limit, exclusions.sigma, exclusions.tail
    );
    println!("Min / Max:      {:.3} / {:.3}", d.min, d.max);
    println!("Mode:           {:.3}", d.mode);
    println!("Mean:           {:.3}", d.mean);
    println!("Std Dev:        {:.3}", d.std_dev);
    println!();
    println!("--- Goodness of Fit (R²) ---");
    for fit in unit.fit_ranking() {
        let marker = if fit.family == unit.best_fit { " (best)" } else { "" };
        println!("{:<15} {:.4}{marker}", fit.family.name(), fit.score);
    }
    println!();
    println!(
        "Using:          {} ({})",
        unit.effective_family(),
        unit.selected_distribution
    );
    println!("Planned P50:    {:.3}", unit.planned.p50);
    match &unit.status.message {
        Some(msg) => println!("Status:         {}: {msg}", unit.status.status),
        None => println!("Status:         {}", unit.status.status),
    }

    Ok(())
}

fn run_simulate(
    config_path: &Path,
    seed: Option<u64>,
    view: &BatchFilter,
    json: bool,
) -> Result<()> {
    let mut plan = AnalysisPlan::from_file(config_path)
        .with_context(|| format!("loading plan {}", config_path.display()))?;
    if let Some(seed) = seed {
        plan.seed = seed;
    }
    tracing::debug!(
        path = %config_path.display(),
        seed = plan.seed,
        units = plan.unit_count(),
        "simulating plan"
    );

    let mut batch = AnalysisBatch::new(generate_units(&plan));
    if let Some(global) = &plan.global {
        batch = batch.apply_global(global);
    }
    let summary = batch.summary();

    if json {
        let units: Vec<&AnalysisUnit> = batch.view(view).collect();
        let report = serde_json::json!({
            "seed": plan.seed,
            "summary": summary,
            "units": units,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("=== Simulation ===");
    println!("Seed:           {}", plan.seed);
    println!(
        "Units:          {} ({} assets × {} metrics × {} months)",
        summary.units,
        plan.assets.len(),
        plan.metrics.len(),
        plan.months
    );
    println!(
        "Status:         {} OK, {} Warning, {} Error",
        summary.ok, summary.warning, summary.error
    );
    println!("--- Best Fits ---");
    for (family, count) in &summary.best_fits {
        println!("{family:<15} {count}");
    }
    println!();
    println!(
        "{:<28} {:<10} {:>6} {:>10} {:>10} {:<11} {:<8} Message",
        "Unit", "Month", "Kept", "Mean", "P50", "Dist", "Status"
    );
    for unit in batch.view(view) {
        println!(
            "{:<28} {:<10} {:>6} {:>10.2} {:>10.2} {:<11} {:<8} {}",
            unit.id,
            unit.key.label,
            unit.filtered_history.len(),
            unit.distribution.mean,
            unit.planned.p50,
            unit.effective_family().name(),
            unit.status.status.to_string(),
            unit.status.message.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
