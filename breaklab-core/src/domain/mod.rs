//! Domain types for the breakout engine.

pub mod bar;
pub mod position;
pub mod resolution;
pub mod trade;

pub use bar::Bar;
pub use position::{Position, Side};
pub use resolution::Resolution;
pub use trade::{ExitKind, Trade};
