//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is the simple rolling mean of true range over the window, not
//! Wilder smoothing.

use crate::domain::Bar;
use std::collections::VecDeque;

/// Compute the true range of `bar` against the previous close.
/// Without a previous close (first bar) it is just high - low.
pub fn true_range(bar: &Bar, prev_close: Option<f64>) -> f64 {
    let high_low = bar.high - bar.low;
    match prev_close {
        Some(pc) => high_low.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
        None => high_low,
    }
}

/// Incremental ATR over a fixed window of sealed bars.
///
/// Maintains a running sum over a ring of the last `period` true ranges;
/// `value()` is `None` until the window is full.
#[derive(Debug, Clone)]
pub struct RollingAtr {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    prev_close: Option<f64>,
}

impl RollingAtr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
            prev_close: None,
        }
    }

    pub fn update(&mut self, bar: &Bar) {
        let tr = true_range(bar, self.prev_close);
        self.prev_close = Some(bar.close);
        self.window.push_back(tr);
        self.sum += tr;
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap_or(0.0);
        }
    }

    pub fn ready(&self) -> bool {
        self.window.len() == self.period
    }

    pub fn value(&self) -> Option<f64> {
        self.ready().then(|| self.sum / self.period as f64)
    }
}
