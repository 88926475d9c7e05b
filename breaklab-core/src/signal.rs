//! Signal & risk evaluation: breakout entries, trend filter, stop/target
//! placement, and risk-based sizing.

use crate::domain::{Bar, Side};
use crate::indicators::IndicatorSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed strategy configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Window (in sealed base bars) for the breakout highest/lowest.
    pub lookback: usize,
    /// Window for the average true range.
    pub atr_period: usize,
    /// Stop distance in ATR multiples.
    pub atr_mult_stop: f64,
    /// Target distance as a multiple of the stop distance.
    pub reward_to_risk: f64,
    /// Fraction of current equity risked per trade.
    pub risk_fraction: f64,
    /// Window for the trend-filter SMA on the designated higher resolution.
    pub trend_filter_period: usize,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            atr_period: 14,
            atr_mult_stop: 2.0,
            reward_to_risk: 2.0,
            risk_fraction: 0.01,
            trend_filter_period: 200,
        }
    }
}

/// A sized order emitted by the signal engine, awaiting its fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: Side,
    /// The close that triggered the signal; the fill applies slippage on top.
    pub signal_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub size: f64,
    pub time: DateTime<Utc>,
    pub reason: String,
}

/// Position size for a given risk budget and stop distance.
///
/// `None` when the stop distance is degenerate (zero) or the result is
/// non-positive or non-finite — the order is suppressed, not an error.
pub fn size_by_risk(equity: f64, risk_fraction: f64, entry: f64, stop: f64) -> Option<f64> {
    let risk_per_unit = (entry - stop).abs();
    if risk_per_unit <= 0.0 {
        return None;
    }
    let size = equity * risk_fraction / risk_per_unit;
    (size.is_finite() && size > 0.0).then_some(size)
}

/// Evaluates entry conditions once per base bar, against indicator state as
/// of the previous sealed bar.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    params: RiskParams,
}

impl SignalEngine {
    pub fn new(params: RiskParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    /// Trend flags from the designated higher resolution.
    ///
    /// `(close > sma, close < sma)` over sealed bars; both false while the
    /// SMA is not ready (hold, not an error); both true when no trend
    /// resolution is configured.
    pub fn trend_flags(trend: Option<&IndicatorSet>) -> (bool, bool) {
        match trend {
            None => (true, true),
            Some(set) => match (set.last_close(), set.sma()) {
                (Some(close), Some(sma)) => (close > sma, close < sma),
                _ => (false, false),
            },
        }
    }

    /// Evaluate the current base bar for an entry. Call only when flat.
    ///
    /// The breakout compares the bar's close against the rolling extreme of
    /// the window ending at the *previous* sealed bar. Long takes precedence
    /// over short on the pathological simultaneous trigger.
    pub fn evaluate(
        &self,
        bar: &Bar,
        base: &IndicatorSet,
        trend: Option<&IndicatorSet>,
        equity: f64,
    ) -> Option<OrderIntent> {
        let filtered = trend.is_some();
        let (trend_up, trend_dn) = Self::trend_flags(trend);
        if !trend_up && !trend_dn {
            return None;
        }

        let atr = base.atr()?;
        let prior_high = base.prior_high()?;
        let prior_low = base.prior_low()?;
        let close = bar.close;

        if trend_up && close > prior_high {
            let reason = if filtered {
                format!("long (trend up) breakout > hh({})", self.params.lookback)
            } else {
                format!("long breakout > hh({})", self.params.lookback)
            };
            self.build(Side::Long, close, atr, equity, bar.timestamp, reason)
        } else if trend_dn && close < prior_low {
            let reason = if filtered {
                format!("short (trend down) breakout < ll({})", self.params.lookback)
            } else {
                format!("short breakout < ll({})", self.params.lookback)
            };
            self.build(Side::Short, close, atr, equity, bar.timestamp, reason)
        } else {
            None
        }
    }

    fn build(
        &self,
        side: Side,
        entry: f64,
        atr: f64,
        equity: f64,
        time: DateTime<Utc>,
        reason: String,
    ) -> Option<OrderIntent> {
        let sign = side.sign();
        let stop = entry - sign * atr * self.params.atr_mult_stop;
        let target = entry + sign * (entry - stop).abs() * self.params.reward_to_risk;
        let size = size_by_risk(equity, self.params.risk_fraction, entry, stop)?;
        Some(OrderIntent {
            side,
            signal_price: entry,
            stop_price: stop,
            target_price: target,
            size,
            time,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_ohlc_bars, IndicatorSet};

    fn warm_set(bars: &[(f64, f64, f64, f64)]) -> (IndicatorSet, crate::domain::Bar) {
        let bars = make_ohlc_bars(bars);
        let mut set = IndicatorSet::new(2, 2, 2);
        for bar in &bars {
            set.update(bar);
        }
        let last = bars.last().unwrap().clone();
        (set, last)
    }

    fn params() -> RiskParams {
        RiskParams {
            lookback: 2,
            atr_period: 2,
            ..RiskParams::default()
        }
    }

    #[test]
    fn size_by_risk_formula() {
        // 10_000 * 1% = 100 at risk; stop 2 below entry -> 50 units.
        assert_eq!(size_by_risk(10_000.0, 0.01, 100.0, 98.0), Some(50.0));
    }

    #[test]
    fn size_by_risk_degenerate_stop() {
        assert_eq!(size_by_risk(10_000.0, 0.01, 100.0, 100.0), None);
    }

    #[test]
    fn size_by_risk_non_positive_equity() {
        assert_eq!(size_by_risk(0.0, 0.01, 100.0, 98.0), None);
        assert_eq!(size_by_risk(-500.0, 0.01, 100.0, 98.0), None);
    }

    #[test]
    fn size_by_risk_non_finite() {
        assert_eq!(size_by_risk(f64::INFINITY, 0.01, 100.0, 98.0), None);
    }

    #[test]
    fn long_breakout_triggers() {
        // Prior rolling high over lookback 2 is 10; close 12 breaks out.
        let (set, bar) = warm_set(&[
            (10.0, 10.0, 9.0, 10.0),
            (10.0, 10.0, 9.0, 10.0),
            (10.0, 12.0, 9.8, 12.0),
        ]);
        let engine = SignalEngine::new(params());
        let intent = engine.evaluate(&bar, &set, None, 10_000.0).unwrap();
        assert_eq!(intent.side, Side::Long);
        assert_eq!(intent.signal_price, 12.0);
        assert!(intent.stop_price < 12.0);
        assert!(intent.target_price > 12.0);
        assert!(intent.size > 0.0);
    }

    #[test]
    fn short_breakout_triggers() {
        let (set, bar) = warm_set(&[
            (10.0, 11.0, 10.0, 10.0),
            (10.0, 11.0, 10.0, 10.0),
            (10.0, 10.2, 8.0, 8.0),
        ]);
        let engine = SignalEngine::new(params());
        let intent = engine.evaluate(&bar, &set, None, 10_000.0).unwrap();
        assert_eq!(intent.side, Side::Short);
        assert!(intent.stop_price > 8.0);
        assert!(intent.target_price < 8.0);
    }

    #[test]
    fn no_entry_without_breakout() {
        let (set, bar) = warm_set(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 10.8, 9.2, 10.5),
        ]);
        let engine = SignalEngine::new(params());
        assert!(engine.evaluate(&bar, &set, None, 10_000.0).is_none());
    }

    #[test]
    fn stop_and_target_arithmetic() {
        // Every bar has true range 1 (the breakout bar included), so the
        // ATR is exactly 1; mult 2 and RR 2 give stop = entry - 2 and
        // target = entry + 4.
        let (set, bar) = warm_set(&[
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 10.8, 9.8, 10.8),
        ]);
        let engine = SignalEngine::new(params());
        let intent = engine.evaluate(&bar, &set, None, 10_000.0).unwrap();
        assert!((intent.stop_price - 8.8).abs() < 1e-10);
        assert!((intent.target_price - 14.8).abs() < 1e-10);
        // Risk-based size: 1% of 10_000 over a 2.0 stop distance.
        assert!((intent.size - 50.0).abs() < 1e-10);
    }

    #[test]
    fn trend_filter_blocks_counter_trend_entry() {
        let (set, bar) = warm_set(&[
            (10.0, 10.0, 9.0, 10.0),
            (10.0, 10.0, 9.0, 10.0),
            (10.0, 12.0, 9.8, 12.0),
        ]);
        // Higher-resolution closes falling: last close below its SMA.
        let mut trend = IndicatorSet::new(2, 2, 2);
        for bar in make_ohlc_bars(&[(20.0, 20.5, 19.5, 20.0), (18.0, 18.5, 17.5, 18.0)]) {
            trend.update(&bar);
        }
        let engine = SignalEngine::new(params());
        assert!(engine.evaluate(&bar, &set, Some(&trend), 10_000.0).is_none());
    }

    #[test]
    fn unready_trend_filter_holds() {
        let (set, bar) = warm_set(&[
            (10.0, 10.0, 9.0, 10.0),
            (10.0, 10.0, 9.0, 10.0),
            (10.0, 12.0, 9.8, 12.0),
        ]);
        // Trend set with too little history: both flags false, hold.
        let trend = IndicatorSet::new(2, 2, 2);
        assert_eq!(SignalEngine::trend_flags(Some(&trend)), (false, false));
        let engine = SignalEngine::new(params());
        assert!(engine.evaluate(&bar, &set, Some(&trend), 10_000.0).is_none());
    }

    #[test]
    fn missing_trend_resolution_disables_filter() {
        assert_eq!(SignalEngine::trend_flags(None), (true, true));
    }

    #[test]
    fn degenerate_atr_suppresses_order() {
        // ATR = 0 puts the stop on the entry; sizing degenerates and the
        // order is suppressed rather than raised.
        let (_, bar) = warm_set(&[(10.0, 10.0, 10.0, 10.0)]);
        let engine = SignalEngine::new(params());
        assert!(engine
            .build(Side::Long, 12.0, 0.0, 10_000.0, bar.timestamp, "x".into())
            .is_none());
    }
}
