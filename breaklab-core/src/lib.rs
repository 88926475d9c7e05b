//! BreakLab Core — the bar-by-bar breakout simulation engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, resolutions, positions, trades)
//! - Multi-resolution bar aggregation with an explicit seal boundary
//! - Incremental rolling indicators (ATR, SMA, highest/lowest)
//! - Signal & risk evaluation (breakout entries, stop/target, sizing)
//! - Position lifecycle state machine with slippage fills
//! - Append-only trade ledger and the simulation loop
//!
//! The engine is deliberately single-threaded: every bar's decision
//! depends on the cumulative state left by all prior bars. Parallelism
//! belongs across independent runs (see the runner crate's sweeps), never
//! inside one.

pub mod aggregate;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod lifecycle;
pub mod signal;

pub use aggregate::{BarAggregator, ResolutionView};
pub use domain::{Bar, ExitKind, Position, Resolution, Side, Trade};
pub use engine::{run_simulation, SimConfig, SimulationOutcome};
pub use error::MalformedInput;
pub use indicators::IndicatorSet;
pub use ledger::TradeLedger;
pub use lifecycle::{LifecycleState, PositionLifecycle};
pub use signal::{size_by_risk, OrderIntent, RiskParams, SignalEngine};
