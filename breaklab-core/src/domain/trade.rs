//! Trade — a completed round-trip, produced when a position closes.

use super::position::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What triggered the exit. When stop and target are both breached on the
/// same bar (a gap), the stop wins — the conservative resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitKind {
    Stop,
    Target,
}

/// Immutable record of one closed position. Appended to the ledger in exit
/// order and never mutated afterward.
///
/// `gross_pnl` is measured at the frictionless signal closes; `net_pnl` at
/// the slippage-adjusted fill prices. The two differ by exactly one full
/// spread per unit: `gross_pnl - net_pnl == 2 * half_spread * size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub size: f64,
    pub entry_time: DateTime<Utc>,
    /// Entry fill price, slippage included.
    pub entry_price: f64,
    pub exit_time: DateTime<Utc>,
    /// Exit fill price, slippage included.
    pub exit_price: f64,
    pub gross_pnl: f64,
    pub net_pnl: f64,
    pub reason: String,
    pub exit_kind: ExitKind,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}
