//! FolioLab Runner — backtest orchestration, metrics, sweeps, export.
//!
//! This crate builds on `foliolab-core` to provide:
//! - Serializable run configuration with content-addressed run IDs
//! - The full walk-forward runner (schedule → score → select → simulate)
//! - Summary metrics over the trade tape and period equity curve
//! - Parallel parameter sweeps over trigger grids with objective ranking
//! - JSON/CSV artifact export with schema versioning

pub mod config;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, ResumeCursor, RuleProfile, RunConfig, RunId};
pub use export::{
    export_json, export_snapshots_csv, export_trades_csv, import_json, write_artifacts,
};
pub use metrics::SummaryMetrics;
pub use runner::{run_backtest, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{best_by, sweep, Objective, SweepRow, TriggerGrid};
