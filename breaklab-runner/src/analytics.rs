//! Performance analytics — pure functions that reduce the trade ledger.
//!
//! Every function takes the ledger (and initial capital where needed) and
//! returns derived values; nothing here mutates or depends on engine
//! state. The equity curve is recomputed from the ledger on demand, never
//! stored by the simulation.

use breaklab_core::{Side, Trade};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of the trade-resolution equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub equity: f64,
    /// Fractional decline from the running equity peak; always <= 0 and
    /// exactly 0 whenever equity sets a new peak.
    pub drawdown: f64,
}

/// Aggregate statistics over the full ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    /// Winning fraction; 0 for an empty ledger.
    pub win_rate: f64,
    pub net_pnl: f64,
    /// `None` is the "infinite/undefined" sentinel: no losing trades to
    /// divide by (which includes the empty ledger).
    pub profit_factor: Option<f64>,
    /// Mean net P&L per trade; 0 for an empty ledger.
    pub expectancy: f64,
    /// Most negative drawdown; 0 for an empty ledger.
    pub max_drawdown: f64,
    pub initial_capital: f64,
    pub final_equity: f64,
}

/// Equity after each trade: initial capital plus cumulative net P&L,
/// ordered by exit time (the ledger's append order).
pub fn equity_curve(trades: &[Trade], initial_capital: f64) -> Vec<EquityPoint> {
    let mut equity = initial_capital;
    let mut peak = initial_capital;
    trades
        .iter()
        .map(|trade| {
            equity += trade.net_pnl;
            peak = peak.max(equity);
            EquityPoint {
                time: trade.exit_time,
                equity,
                drawdown: (equity - peak) / peak,
            }
        })
        .collect()
}

/// Summary statistics. Division-by-zero cases report defined neutral
/// values instead of failing: win rate and expectancy are 0 without
/// trades, and the profit factor is the `None` sentinel without losers.
pub fn summary(trades: &[Trade], initial_capital: f64) -> Summary {
    let total = trades.len();
    let net_pnl: f64 = trades.iter().map(|t| t.net_pnl).sum();

    let gross_wins: f64 = trades.iter().filter(|t| t.net_pnl > 0.0).map(|t| t.net_pnl).sum();
    let gross_losses: f64 = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| t.net_pnl.abs())
        .sum();
    let winners = trades.iter().filter(|t| t.is_winner()).count();

    let win_rate = if total > 0 {
        winners as f64 / total as f64
    } else {
        0.0
    };
    let profit_factor = (gross_losses > 0.0).then(|| gross_wins / gross_losses);
    let expectancy = if total > 0 { net_pnl / total as f64 } else { 0.0 };
    let max_drawdown = equity_curve(trades, initial_capital)
        .iter()
        .map(|p| p.drawdown)
        .fold(0.0_f64, f64::min);

    Summary {
        total_trades: total,
        win_rate,
        net_pnl,
        profit_factor,
        expectancy,
        max_drawdown,
        initial_capital,
        final_equity: initial_capital + net_pnl,
    }
}

/// Net P&L per exit year, sorted by year.
pub fn pnl_by_year(trades: &[Trade]) -> Vec<(i32, f64)> {
    let mut buckets: BTreeMap<i32, f64> = BTreeMap::new();
    for trade in trades {
        *buckets.entry(trade.exit_time.year()).or_insert(0.0) += trade.net_pnl;
    }
    buckets.into_iter().collect()
}

/// Net P&L per exit calendar month as `"YYYY-MM"`, sorted chronologically
/// (zero-padded keys make the lexicographic order chronological).
pub fn pnl_by_month(trades: &[Trade]) -> Vec<(String, f64)> {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        let key = format!("{:04}-{:02}", trade.exit_time.year(), trade.exit_time.month());
        *buckets.entry(key).or_insert(0.0) += trade.net_pnl;
    }
    buckets.into_iter().collect()
}

/// Net P&L per side, sorted by descending total.
pub fn pnl_by_side(trades: &[Trade]) -> Vec<(Side, f64)> {
    let mut long = 0.0;
    let mut short = 0.0;
    let mut seen_long = false;
    let mut seen_short = false;
    for trade in trades {
        match trade.side {
            Side::Long => {
                long += trade.net_pnl;
                seen_long = true;
            }
            Side::Short => {
                short += trade.net_pnl;
                seen_short = true;
            }
        }
    }
    let mut out = Vec::new();
    if seen_long {
        out.push((Side::Long, long));
    }
    if seen_short {
        out.push((Side::Short, short));
    }
    out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Everything the presentation layer consumes, computed once after the
/// simulation completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub equity_curve: Vec<EquityPoint>,
    pub pnl_by_year: Vec<(i32, f64)>,
    pub pnl_by_month: Vec<(String, f64)>,
    pub pnl_by_side: Vec<(Side, f64)>,
}

impl AnalyticsReport {
    pub fn compute(trades: &[Trade], initial_capital: f64) -> Self {
        Self {
            summary: summary(trades, initial_capital),
            equity_curve: equity_curve(trades, initial_capital),
            pnl_by_year: pnl_by_year(trades),
            pnl_by_month: pnl_by_month(trades),
            pnl_by_side: pnl_by_side(trades),
        }
    }
}
