//! Position and trade direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a position or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1.0 for long, -1.0 for short. P&L = sign * (exit - entry) * size.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// An open position. At most one exists at any time; it is created on entry
/// fill and consumed (converted into a `Trade`) on exit. Stop and target are
/// fixed at entry and never adjusted mid-life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub size: f64,
    /// Fill price, slippage included — not the signal price.
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub entry_time: DateTime<Utc>,
    pub reason: String,
}
