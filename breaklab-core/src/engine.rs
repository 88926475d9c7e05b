//! Bar-by-bar simulation loop.
//!
//! Strictly sequential: for each base bar — aggregate and seal coarser
//! bars, update indicator sets (sealed coarse bars first, then the base
//! bar), then let the lifecycle check exits or the signal engine look for
//! an entry. Equity is an explicit value threaded through the loop, not a
//! broker singleton, so independent runs are fully isolated.

use crate::aggregate::BarAggregator;
use crate::domain::{Bar, Resolution};
use crate::error::MalformedInput;
use crate::indicators::IndicatorSet;
use crate::ledger::TradeLedger;
use crate::lifecycle::PositionLifecycle;
use crate::signal::{RiskParams, SignalEngine};

/// Full configuration of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub risk: RiskParams,
    pub initial_capital: f64,
    /// Fixed half-spread applied against the trader on every fill.
    pub half_spread: f64,
    /// Resolution of the input feed.
    pub base_resolution: Resolution,
    /// Coarser resolutions the aggregator derives.
    pub aggregate_resolutions: Vec<Resolution>,
    /// Resolution whose SMA gates entries; `None` disables the filter.
    pub trend_resolution: Option<Resolution>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            risk: RiskParams::default(),
            initial_capital: 10_000.0,
            // One side of a 0.20 quoted spread.
            half_spread: 0.1,
            base_resolution: Resolution::Min5,
            aggregate_resolutions: Resolution::coarser().to_vec(),
            trend_resolution: Some(Resolution::Hour1),
        }
    }
}

/// What one completed run produces: the ledger plus final realized equity.
/// Equity/drawdown series and summary statistics are recomputed from the
/// ledger by the analytics layer, not stored here.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub ledger: TradeLedger,
    pub final_equity: f64,
    pub bars_processed: usize,
}

/// Run one simulation over an ordered base bar sequence.
///
/// Fails fast on malformed input: the error surfaces immediately and no
/// partial ledger is returned.
pub fn run_simulation(bars: &[Bar], config: &SimConfig) -> Result<SimulationOutcome, MalformedInput> {
    let mut resolutions = config.aggregate_resolutions.clone();
    if let Some(trend) = config.trend_resolution {
        if trend != config.base_resolution && !resolutions.contains(&trend) {
            resolutions.push(trend);
        }
    }

    let mut aggregator = BarAggregator::new(&resolutions);
    let new_set = || {
        IndicatorSet::new(
            config.risk.lookback,
            config.risk.atr_period,
            config.risk.trend_filter_period,
        )
    };
    let mut coarse_sets: Vec<(Resolution, IndicatorSet)> =
        resolutions.iter().map(|&r| (r, new_set())).collect();
    let mut base_set = new_set();

    let signal = SignalEngine::new(config.risk.clone());
    let mut lifecycle = PositionLifecycle::new(config.half_spread);
    let mut ledger = TradeLedger::new();
    let mut equity = config.initial_capital;

    for bar in bars {
        let sealed = aggregator.push(bar)?;
        for (resolution, coarse) in &sealed {
            if let Some((_, set)) = coarse_sets.iter_mut().find(|(r, _)| r == resolution) {
                set.update(coarse);
            }
        }
        base_set.update(bar);

        if !lifecycle.is_flat() {
            if let Some(trade) = lifecycle.check_exit(bar) {
                equity += trade.net_pnl;
                ledger.push(trade);
                // Back to flat, but not eligible again until the next bar.
            }
        } else {
            let trend_set: Option<&IndicatorSet> = match config.trend_resolution {
                None => None,
                Some(r) if r == config.base_resolution => Some(&base_set),
                Some(r) => coarse_sets.iter().find(|(res, _)| *res == r).map(|(_, s)| s),
            };
            if let Some(intent) = signal.evaluate(bar, &base_set, trend_set, equity) {
                lifecycle.submit(intent);
                lifecycle.fill_entry(bar);
            }
        }
    }

    Ok(SimulationOutcome {
        ledger,
        final_equity: equity,
        bars_processed: bars.len(),
    })
}
