//! Incremental rolling indicators.
//!
//! Every indicator is an O(1)-amortized window structure updated once per
//! sealed bar of its resolution. Consulting an indicator before its window
//! is full yields `None`, never a partial value. Batch recomputation over
//! the full history never happens — the windows are the state.

pub mod atr;
pub mod extremes;
pub mod sma;

pub use atr::{true_range, RollingAtr};
pub use extremes::RollingExtreme;
pub use sma::RollingSma;

use crate::domain::Bar;

/// The rolling statistics one resolution maintains: ATR, the trend-filter
/// SMA of closes, and the breakout extremes of highs/lows.
///
/// Updated only with sealed bars; the forming aggregate never reaches it.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    atr: RollingAtr,
    sma: RollingSma,
    highest: RollingExtreme,
    lowest: RollingExtreme,
    last_close: Option<f64>,
}

impl IndicatorSet {
    pub fn new(lookback: usize, atr_period: usize, trend_period: usize) -> Self {
        Self {
            atr: RollingAtr::new(atr_period),
            sma: RollingSma::new(trend_period),
            highest: RollingExtreme::highest(lookback),
            lowest: RollingExtreme::lowest(lookback),
            last_close: None,
        }
    }

    pub fn update(&mut self, bar: &Bar) {
        self.atr.update(bar);
        self.sma.update(bar.close);
        self.highest.update(bar.high);
        self.lowest.update(bar.low);
        self.last_close = Some(bar.close);
    }

    pub fn atr(&self) -> Option<f64> {
        self.atr.value()
    }

    pub fn sma(&self) -> Option<f64> {
        self.sma.value()
    }

    /// Rolling highest high of the window ending at the previous sealed bar.
    pub fn prior_high(&self) -> Option<f64> {
        self.highest.prev()
    }

    /// Rolling lowest low of the window ending at the previous sealed bar.
    pub fn prior_low(&self) -> Option<f64> {
        self.lowest.prev()
    }

    /// Close of the most recent sealed bar.
    pub fn last_close(&self) -> Option<f64> {
        self.last_close
    }
}

/// Create bars from (open, high, low, close) tuples for testing, spaced
/// five minutes apart.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    use chrono::TimeZone;
    let start = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: start + chrono::Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
