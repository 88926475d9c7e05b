//! Look-ahead contamination tests.
//!
//! Invariants:
//! - The rolling extreme consulted for entry is computed from bars sealed
//!   *before* the current bar: perturbing the current bar's high/low must
//!   never change the entry decision.
//! - A coarser aggregate is invisible until the first base bar of the next
//!   period arrives.
//! - Decisions up to bar t are identical whether or not bars after t exist
//!   (truncation invariance).

use breaklab_core::{run_simulation, Bar, BarAggregator, Resolution, RiskParams, SimConfig};
use chrono::{DateTime, TimeZone, Utc};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()
}

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start() + chrono::Duration::minutes(5 * i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 100.0,
        })
        .collect()
}

fn tight_config() -> SimConfig {
    SimConfig {
        risk: RiskParams {
            lookback: 2,
            atr_period: 2,
            trend_filter_period: 2,
            ..RiskParams::default()
        },
        aggregate_resolutions: vec![],
        trend_resolution: None,
        ..SimConfig::default()
    }
}

/// Deterministic pseudo-random walk using a simple LCG — no RNG dependency.
fn make_walk_bars(n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    for i in 0..n {
        let seed = (i as u64)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 200) as f64 / 10.0 - 10.0; // -10.0 .. +9.9
        price = (price + change * 0.3).max(10.0);

        let open = price - 0.2;
        let close = price;
        let high = open.max(close) + 1.0;
        let low = open.min(close) - 1.0;
        bars.push(Bar {
            timestamp: start() + chrono::Duration::minutes(5 * i as i64),
            open,
            high,
            low,
            close,
            volume: 1_000.0 + i as f64,
        });
    }
    bars
}

#[test]
fn forming_bar_extremes_never_gate_the_entry() {
    // Baseline: closes 10, 10, 12 trigger a long on the third bar.
    let baseline = bars_from_closes(&[10.0, 10.0, 12.0, 30.0]);

    // Perturbed: the triggering bar's own wick is widened. Were the rolling
    // high computed over the current bar, the breakout comparison would be
    // against 13 instead of 10.5 and the decision could flip.
    let mut perturbed = baseline.clone();
    perturbed[2].high = 13.0;
    perturbed[2].low = 9.0;

    let base_outcome = run_simulation(&baseline, &tight_config()).unwrap();
    let pert_outcome = run_simulation(&perturbed, &tight_config()).unwrap();

    assert_eq!(base_outcome.ledger.len(), 1);
    assert_eq!(pert_outcome.ledger.len(), 1);

    let a = &base_outcome.ledger.trades()[0];
    let b = &pert_outcome.ledger.trades()[0];
    // Same decision, same bar, same fill. (Stop/target shift with the ATR,
    // but the entry itself must not.)
    assert_eq!(a.entry_time, b.entry_time);
    assert_eq!(a.entry_price, b.entry_price);
    assert_eq!(a.side, b.side);
}

#[test]
fn prior_extreme_ignores_the_current_bar_entirely() {
    use breaklab_core::IndicatorSet;

    let bars = bars_from_closes(&[10.0, 10.0, 12.0]);
    let mut plain = IndicatorSet::new(2, 2, 2);
    let mut spiked = IndicatorSet::new(2, 2, 2);

    for bar in &bars[..2] {
        plain.update(bar);
        spiked.update(bar);
    }
    let mut spiked_bar = bars[2].clone();
    spiked_bar.high = 500.0;
    spiked_bar.low = 0.5;
    plain.update(&bars[2]);
    spiked.update(&spiked_bar);

    // The entry consults prior_high/prior_low, which by construction end
    // at the previous bar: an arbitrarily wild current bar cannot move them.
    assert_eq!(plain.prior_high(), spiked.prior_high());
    assert_eq!(plain.prior_low(), spiked.prior_low());
}

#[test]
fn coarse_bar_invisible_until_next_period_begins() {
    let mut agg = BarAggregator::new(&[Resolution::Min15]);
    let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);

    // 09:00–09:10 accumulate into the forming 09:00 bar: nothing visible.
    for bar in &bars[..3] {
        agg.push(bar).unwrap();
        assert!(agg.view(Resolution::Min15).unwrap().is_empty());
    }

    // 09:15 starts the next period: exactly the 09:00 bar becomes visible,
    // and the bars now accumulating stay hidden.
    for bar in &bars[3..] {
        agg.push(bar).unwrap();
        let view = agg.view(Resolution::Min15).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.last().unwrap().timestamp, start());
    }
}

#[test]
fn truncation_invariance_of_the_trade_sequence() {
    let full = make_walk_bars(400);
    let truncated = &full[..200];
    let cutoff = truncated.last().unwrap().timestamp;

    let config = tight_config();
    let full_outcome = run_simulation(&full, &config).unwrap();
    let truncated_outcome = run_simulation(truncated, &config).unwrap();

    // Every trade the truncated run booked appears identically in the full
    // run, and the full run booked nothing extra before the cutoff.
    let full_prefix: Vec<_> = full_outcome
        .ledger
        .iter()
        .filter(|t| t.exit_time <= cutoff)
        .cloned()
        .collect();
    assert_eq!(truncated_outcome.ledger.trades(), full_prefix.as_slice());
}

#[test]
fn truncation_invariance_with_hourly_trend_filter() {
    let full = make_walk_bars(600);
    let truncated = &full[..300];
    let cutoff = truncated.last().unwrap().timestamp;

    let config = SimConfig {
        risk: RiskParams {
            lookback: 5,
            atr_period: 5,
            trend_filter_period: 3,
            ..RiskParams::default()
        },
        aggregate_resolutions: vec![Resolution::Min15, Resolution::Hour1],
        trend_resolution: Some(Resolution::Hour1),
        ..SimConfig::default()
    };
    let full_outcome = run_simulation(&full, &config).unwrap();
    let truncated_outcome = run_simulation(truncated, &config).unwrap();

    let full_prefix: Vec<_> = full_outcome
        .ledger
        .iter()
        .filter(|t| t.exit_time <= cutoff)
        .cloned()
        .collect();
    assert_eq!(truncated_outcome.ledger.trades(), full_prefix.as_slice());
}
