//! Metrics provider port.

use crate::domain::error::SleeveError;
use crate::domain::snapshot::MetricsSnapshot;

/// Supplies a fundamentals/market snapshot for a ticker.
///
/// Implementations may return partially absent snapshots. An `Err` for one
/// ticker never aborts a portfolio build; the builder substitutes an
/// all-absent snapshot and carries on.
pub trait MetricsPort {
    fn fetch(&self, ticker: &str) -> Result<MetricsSnapshot, SleeveError>;
}
