//! BreakLab Runner — backtest orchestration on top of `breaklab-core`.
//!
//! This crate provides:
//! - Serializable run configuration with deterministic run ids
//! - Analytics over the trade ledger (equity, drawdown, summary, groupings)
//! - Single-backtest execution with timing metadata
//! - Parameter sweeps parallelized across independent runs
//! - CSV loading/writing and seeded synthetic demo data
//! - JSON artifact export per run

pub mod analytics;
pub mod config;
pub mod data;
pub mod export;
pub mod runner;
pub mod sweep;

pub use analytics::{
    equity_curve, pnl_by_month, pnl_by_side, pnl_by_year, summary, AnalyticsReport, EquityPoint,
    Summary,
};
pub use config::{ConfigError, RunConfig, RunId};
pub use data::{load_bars_csv, synthetic_bars, write_bars_csv, LoadError};
pub use export::{save_artifacts, ArtifactPaths};
pub use runner::{run_single_backtest, BacktestResult, RunError};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};
