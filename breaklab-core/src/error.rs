//! Structural input errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A structurally invalid base bar sequence.
///
/// All variants are fatal: the run aborts at the offending bar and no
/// partial ledger is emitted. The engine never attempts repair or
/// skip-and-continue — a corrupted temporal order would invalidate every
/// subsequent decision.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedInput {
    #[error("base bar timestamps must be strictly increasing: {prev} followed by {next}")]
    NonMonotonicTimestamp {
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },

    #[error("duplicate base bar timestamp: {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    #[error("bar at {0} violates low <= open/close <= high or has non-finite fields")]
    InvalidBar(DateTime<Utc>),
}
