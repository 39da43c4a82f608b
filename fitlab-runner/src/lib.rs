//! FitLab Runner: analysis plans, synthetic samples, bulk adjustment.
//!
//! This crate builds on `fitlab-core` to provide:
//! - TOML analysis plans (assets, metrics, planning horizon, seed)
//! - Deterministic per-unit RNG streams derived from one master seed
//! - Synthetic sample generation standing in for historical data
//! - Batches of analysis units with parallel "apply to all" adjustment
//! - Profiling scopes for the hot sections

pub mod batch;
pub mod config;
pub mod profiling;
pub mod rng;
pub mod synthetic;

pub use batch::{AnalysisBatch, BatchError, BatchFilter, BatchSummary, GlobalAdjustment};
pub use config::{AnalysisPlan, AssetSpec, ConfigError, MetricSpec};
pub use rng::RngHierarchy;
pub use synthetic::{generate_units, month_label, synthesize_unit, MetricProfile};
