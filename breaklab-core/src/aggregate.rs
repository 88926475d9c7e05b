//! Multi-resolution OHLC roll-up with an explicit seal boundary.
//!
//! Roll-up per completed period: open = first base open, high = max base
//! high, low = min base low, close = last base close, volume = summed.
//! A coarser bar is sealed — appended to its `ResolutionView` — only when
//! a base bar arrives in a *later* period, so no consumer ever observes a
//! still-accumulating aggregate. Gaps in the base series produce no bar
//! for the missing periods.

use crate::domain::{Bar, Resolution};
use crate::error::MalformedInput;
use chrono::{DateTime, Utc};

/// A coarser bar still accumulating base bars. Internal to the aggregator;
/// decision logic never sees it.
#[derive(Debug, Clone)]
struct FormingBar {
    period: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl FormingBar {
    fn start(period: i64, bar: &Bar) -> Self {
        Self {
            period,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn absorb(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    fn seal(self, resolution: Resolution) -> Bar {
        Bar {
            timestamp: resolution.period_start(self.period),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// Read-only sealed history for one derived resolution. Append-only,
/// owned by the aggregator.
#[derive(Debug, Clone)]
pub struct ResolutionView {
    resolution: Resolution,
    bars: Vec<Bar>,
}

impl ResolutionView {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Rolls an ordered base bar sequence up into one or more coarser
/// resolutions, validating temporal order as it goes.
#[derive(Debug, Clone)]
pub struct BarAggregator {
    views: Vec<ResolutionView>,
    forming: Vec<Option<FormingBar>>,
    last_base: Option<DateTime<Utc>>,
}

impl BarAggregator {
    pub fn new(resolutions: &[Resolution]) -> Self {
        Self {
            views: resolutions
                .iter()
                .map(|&resolution| ResolutionView {
                    resolution,
                    bars: Vec::new(),
                })
                .collect(),
            forming: vec![None; resolutions.len()],
            last_base: None,
        }
    }

    /// Feed the next base bar. Returns the coarser bars its arrival sealed,
    /// in the aggregator's resolution order.
    ///
    /// Rejects non-monotonic, duplicate, and structurally invalid bars; the
    /// offending bar is not absorbed and the caller is expected to abort.
    pub fn push(&mut self, bar: &Bar) -> Result<Vec<(Resolution, Bar)>, MalformedInput> {
        if let Some(prev) = self.last_base {
            if bar.timestamp == prev {
                return Err(MalformedInput::DuplicateTimestamp(bar.timestamp));
            }
            if bar.timestamp < prev {
                return Err(MalformedInput::NonMonotonicTimestamp {
                    prev,
                    next: bar.timestamp,
                });
            }
        }
        if !bar.is_sane() {
            return Err(MalformedInput::InvalidBar(bar.timestamp));
        }
        self.last_base = Some(bar.timestamp);

        let mut sealed = Vec::new();
        for (view, forming) in self.views.iter_mut().zip(self.forming.iter_mut()) {
            let resolution = view.resolution;
            let period = resolution.period_index(bar.timestamp);
            match forming {
                Some(current) if current.period == period => current.absorb(bar),
                Some(current) => {
                    // Timestamps are strictly increasing, so a differing
                    // period index means the current one is complete.
                    let done = std::mem::replace(current, FormingBar::start(period, bar));
                    let coarse = done.seal(resolution);
                    view.bars.push(coarse.clone());
                    sealed.push((resolution, coarse));
                }
                None => *forming = Some(FormingBar::start(period, bar)),
            }
        }
        Ok(sealed)
    }

    /// Sealed history for one resolution, if it is configured.
    pub fn view(&self, resolution: Resolution) -> Option<&ResolutionView> {
        self.views.iter().find(|v| v.resolution == resolution)
    }

    pub fn views(&self) -> &[ResolutionView] {
        &self.views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// 5-minute bars starting at 2024-01-02 09:00 UTC, one per element of
    /// `closes`, with a fixed 1.0 range around the close.
    fn base_bars(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + chrono::Duration::minutes(5 * i as i64),
                open: close - 0.2,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn seals_only_at_next_period() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let bars = base_bars(&[10.0, 11.0, 12.0, 13.0]);

        // 09:00, 09:05, 09:10 accumulate; nothing sealed, nothing visible.
        for bar in &bars[..3] {
            assert!(agg.push(bar).unwrap().is_empty());
            assert!(agg.view(Resolution::Min15).unwrap().is_empty());
        }

        // 09:15 opens the next period and seals the first.
        let sealed = agg.push(&bars[3]).unwrap();
        assert_eq!(sealed.len(), 1);
        assert_eq!(agg.view(Resolution::Min15).unwrap().len(), 1);
    }

    #[test]
    fn rollup_ohlcv_semantics() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let bars = base_bars(&[10.0, 14.0, 8.0, 9.0]);
        for bar in &bars[..3] {
            agg.push(bar).unwrap();
        }
        let sealed = agg.push(&bars[3]).unwrap();
        let (resolution, coarse) = &sealed[0];

        assert_eq!(*resolution, Resolution::Min15);
        assert_eq!(
            coarse.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()
        );
        assert_eq!(coarse.open, 10.0 - 0.2); // first base open
        assert_eq!(coarse.high, 14.0 + 0.5); // max base high
        assert_eq!(coarse.low, 8.0 - 0.5); // min base low
        assert_eq!(coarse.close, 8.0); // last base close
        assert_eq!(coarse.volume, 300.0);
    }

    #[test]
    fn gap_produces_no_synthetic_bar() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        let mk = |offset_min: i64, close: f64| Bar {
            timestamp: start + chrono::Duration::minutes(offset_min),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 100.0,
        };

        agg.push(&mk(0, 10.0)).unwrap();
        // Jump straight to 09:45, skipping the 09:15 and 09:30 periods.
        let sealed = agg.push(&mk(45, 11.0)).unwrap();

        // Only the 09:00 bar seals; the skipped periods yield nothing.
        assert_eq!(sealed.len(), 1);
        assert_eq!(sealed[0].1.timestamp, start);
        assert_eq!(agg.view(Resolution::Min15).unwrap().len(), 1);
    }

    #[test]
    fn multiple_resolutions_seal_independently() {
        let mut agg = BarAggregator::new(&[Resolution::Min15, Resolution::Hour1]);
        // 13 bars: 09:00 .. 10:00.
        let bars = base_bars(&[10.0; 13]);
        let mut sealed_15m = 0;
        let mut sealed_1h = 0;
        for bar in &bars {
            for (resolution, _) in agg.push(bar).unwrap() {
                match resolution {
                    Resolution::Min15 => sealed_15m += 1,
                    Resolution::Hour1 => sealed_1h += 1,
                    _ => unreachable!(),
                }
            }
        }
        // 09:00/09:15/09:30/09:45 sealed as 15m; the 09:00 hour sealed once.
        assert_eq!(sealed_15m, 4);
        assert_eq!(sealed_1h, 1);
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let bars = base_bars(&[10.0]);
        agg.push(&bars[0]).unwrap();
        assert_eq!(
            agg.push(&bars[0]),
            Err(MalformedInput::DuplicateTimestamp(bars[0].timestamp))
        );
    }

    #[test]
    fn rejects_non_monotonic_timestamp() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let bars = base_bars(&[10.0, 11.0]);
        agg.push(&bars[1]).unwrap();
        let err = agg.push(&bars[0]).unwrap_err();
        assert!(matches!(err, MalformedInput::NonMonotonicTimestamp { .. }));
    }

    #[test]
    fn rejects_invalid_bar() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let mut bar = base_bars(&[10.0]).remove(0);
        bar.high = bar.low - 1.0;
        assert_eq!(
            agg.push(&bar),
            Err(MalformedInput::InvalidBar(bar.timestamp))
        );
    }

    #[test]
    fn rejected_bar_leaves_state_untouched() {
        let mut agg = BarAggregator::new(&[Resolution::Min15]);
        let bars = base_bars(&[10.0, 11.0, 12.0, 13.0]);
        agg.push(&bars[0]).unwrap();
        agg.push(&bars[0]).unwrap_err();
        // The duplicate was not absorbed; the sequence continues normally.
        for bar in &bars[1..3] {
            agg.push(bar).unwrap();
        }
        let sealed = agg.push(&bars[3]).unwrap();
        assert_eq!(sealed[0].1.volume, 300.0);
    }
}
