//! Report/export sink port.

use crate::domain::error::SleeveError;
use crate::domain::portfolio::{Pick, ScoredCandidate};

/// Receives the two tabular artifacts of a build.
pub trait ReportPort {
    fn write_picks(&self, picks: &[Pick]) -> Result<(), SleeveError>;

    fn write_universe(&self, table: &[ScoredCandidate]) -> Result<(), SleeveError>;

    /// Default implementation: writes picks, then the universe table.
    fn write_all(&self, picks: &[Pick], table: &[ScoredCandidate]) -> Result<(), SleeveError> {
        self.write_picks(picks)?;
        self.write_universe(table)
    }
}
