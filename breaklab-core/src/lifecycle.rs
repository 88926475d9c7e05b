//! Position lifecycle state machine.
//!
//! `Flat -> PendingEntry -> Open -> (closed) -> Flat`. One order in flight
//! at a time; while pending or open no new entry is accepted. Closing a
//! position produces a `Trade` and returns the machine to `Flat`, eligible
//! again on a *later* bar — the engine never re-enters on the bar it
//! closed on.

use crate::domain::{Bar, ExitKind, Position, Side, Trade};
use crate::signal::OrderIntent;

/// Current lifecycle state. `Closed` is momentary — the machine converts
/// the position into a `Trade` and lands back on `Flat` in the same step.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleState {
    Flat,
    PendingEntry(OrderIntent),
    Open(Position),
}

/// Drives fills and exits for at most one position.
#[derive(Debug, Clone)]
pub struct PositionLifecycle {
    state: LifecycleState,
    /// Fixed half-spread applied against the trader on every fill: buys
    /// pay `close + half_spread`, sells receive `close - half_spread`.
    half_spread: f64,
}

impl PositionLifecycle {
    pub fn new(half_spread: f64) -> Self {
        assert!(
            half_spread >= 0.0 && half_spread.is_finite(),
            "half_spread must be a finite non-negative price offset"
        );
        Self {
            state: LifecycleState::Flat,
            half_spread,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, LifecycleState::Flat)
    }

    pub fn position(&self) -> Option<&Position> {
        match &self.state {
            LifecycleState::Open(position) => Some(position),
            _ => None,
        }
    }

    /// `Flat -> PendingEntry`. The engine only submits while flat.
    pub fn submit(&mut self, intent: OrderIntent) {
        assert!(self.is_flat(), "order submitted while not flat");
        self.state = LifecycleState::PendingEntry(intent);
    }

    /// `PendingEntry -> Open`: fill at the triggering bar's close with
    /// slippage against the trader. The fill price, not the signal price,
    /// becomes the position's entry price.
    pub fn fill_entry(&mut self, bar: &Bar) -> Option<&Position> {
        let intent = match std::mem::replace(&mut self.state, LifecycleState::Flat) {
            LifecycleState::PendingEntry(intent) => intent,
            other => {
                self.state = other;
                return None;
            }
        };

        let fill = match intent.side {
            Side::Long => bar.close + self.half_spread,
            Side::Short => bar.close - self.half_spread,
        };
        self.state = LifecycleState::Open(Position {
            side: intent.side,
            size: intent.size,
            entry_price: fill,
            stop_price: intent.stop_price,
            target_price: intent.target_price,
            entry_time: intent.time,
            reason: intent.reason,
        });
        self.position()
    }

    /// `Open -> Flat` when the bar's close breaches the stop or target,
    /// with side-aware inequalities. If both are breached on one bar (a
    /// gap), the stop wins. Returns the finished trade.
    pub fn check_exit(&mut self, bar: &Bar) -> Option<Trade> {
        let position = match &self.state {
            LifecycleState::Open(position) => position,
            _ => return None,
        };

        let close = bar.close;
        let (stop_hit, target_hit) = match position.side {
            Side::Long => (close <= position.stop_price, close >= position.target_price),
            Side::Short => (close >= position.stop_price, close <= position.target_price),
        };
        if !stop_hit && !target_hit {
            return None;
        }
        let exit_kind = if stop_hit { ExitKind::Stop } else { ExitKind::Target };

        let position = match std::mem::replace(&mut self.state, LifecycleState::Flat) {
            LifecycleState::Open(position) => position,
            _ => unreachable!(),
        };

        // Exit is the opposite side of entry: longs sell out, shorts buy in.
        let exit_fill = match position.side {
            Side::Long => close - self.half_spread,
            Side::Short => close + self.half_spread,
        };
        let sign = position.side.sign();
        let net_pnl = sign * (exit_fill - position.entry_price) * position.size;
        // Slippage is the only friction: one half-spread on each fill.
        let gross_pnl = net_pnl + 2.0 * self.half_spread * position.size;

        Some(Trade {
            side: position.side,
            size: position.size,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_time: bar.timestamp,
            exit_price: exit_fill,
            gross_pnl,
            net_pnl,
            reason: position.reason,
            exit_kind,
        })
    }
}
