//! Single-backtest orchestration: simulate, analyze, package the result.

use breaklab_core::{run_simulation, Bar, MalformedInput, TradeLedger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::AnalyticsReport;
use crate::config::{ConfigError, RunConfig, RunId};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed input: {0}")]
    Input(#[from] MalformedInput),
}

/// Complete result of one backtest run: the ledger, the analytics derived
/// from it, and enough metadata to reproduce and file the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub config: RunConfig,
    pub ledger: TradeLedger,
    pub analytics: AnalyticsReport,
    pub bars_processed: usize,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
}

/// Validate the config, run the simulation over pre-materialized bars, and
/// reduce the ledger into analytics. Fails fast on malformed input with no
/// partial result.
pub fn run_single_backtest(config: &RunConfig, bars: &[Bar]) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    let started_at = Utc::now();
    let clock = std::time::Instant::now();

    tracing::debug!(%run_id, bars = bars.len(), "starting backtest");
    let outcome = run_simulation(bars, &config.to_sim_config())?;
    let analytics = AnalyticsReport::compute(outcome.ledger.trades(), config.initial_capital);
    let duration_secs = clock.elapsed().as_secs_f64();

    tracing::info!(
        %run_id,
        trades = outcome.ledger.len(),
        net_pnl = analytics.summary.net_pnl,
        duration_secs,
        "backtest complete"
    );

    Ok(BacktestResult {
        run_id,
        config: config.clone(),
        ledger: outcome.ledger,
        analytics,
        bars_processed: outcome.bars_processed,
        started_at,
        duration_secs,
    })
}
