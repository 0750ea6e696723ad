//! CSV report adapter.
//!
//! Writes the selected picks and the full scored universe as two CSV files.
//! Absent metrics are written as empty cells.

use crate::domain::error::SleeveError;
use crate::domain::portfolio::{Pick, ScoredCandidate};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const REASON_SEPARATOR: &str = "; ";

#[derive(Debug, Serialize)]
struct PickRow<'a> {
    sleeve: &'a str,
    ticker: &'a str,
    target_weight: f64,
    pe_used: Option<f64>,
    trailing_pe: Option<f64>,
    forward_pe: Option<f64>,
    dividend_yield: Option<f64>,
    beta: Option<f64>,
    score: f64,
    passes_screen: bool,
    fail_reasons: String,
}

impl<'a> From<&'a Pick> for PickRow<'a> {
    fn from(pick: &'a Pick) -> Self {
        let c = &pick.candidate;
        PickRow {
            sleeve: &c.sleeve,
            ticker: c.ticker(),
            target_weight: pick.target_weight,
            pe_used: c.pe_used(),
            trailing_pe: c.metrics.trailing_pe,
            forward_pe: c.metrics.forward_pe,
            dividend_yield: c.metrics.dividend_yield,
            beta: c.metrics.beta,
            score: c.score,
            passes_screen: c.screen.passed,
            fail_reasons: c.screen.reasons.join(REASON_SEPARATOR),
        }
    }
}

#[derive(Debug, Serialize)]
struct UniverseRow<'a> {
    sleeve: &'a str,
    ticker: &'a str,
    trailing_pe: Option<f64>,
    forward_pe: Option<f64>,
    pe_used: Option<f64>,
    profit_margin: Option<f64>,
    return_on_equity: Option<f64>,
    debt_to_equity: Option<f64>,
    market_cap: Option<f64>,
    dividend_yield: Option<f64>,
    beta: Option<f64>,
    price_to_book: Option<f64>,
    peg_ratio: Option<f64>,
    revenue_growth: Option<f64>,
    return_3m: Option<f64>,
    return_6m: Option<f64>,
    proximity_52w: Option<f64>,
    passes_screen: bool,
    fail_reasons: String,
    score: f64,
}

impl<'a> From<&'a ScoredCandidate> for UniverseRow<'a> {
    fn from(c: &'a ScoredCandidate) -> Self {
        let m = &c.metrics;
        UniverseRow {
            sleeve: &c.sleeve,
            ticker: c.ticker(),
            trailing_pe: m.trailing_pe,
            forward_pe: m.forward_pe,
            pe_used: m.pe_used(),
            profit_margin: m.profit_margin,
            return_on_equity: m.return_on_equity,
            debt_to_equity: m.debt_to_equity,
            market_cap: m.market_cap,
            dividend_yield: m.dividend_yield,
            beta: m.beta,
            price_to_book: m.price_to_book,
            peg_ratio: m.peg_ratio,
            revenue_growth: m.revenue_growth,
            return_3m: m.return_3m,
            return_6m: m.return_6m,
            proximity_52w: m.proximity_52w,
            passes_screen: c.screen.passed,
            fail_reasons: c.screen.reasons.join(REASON_SEPARATOR),
            score: c.score,
        }
    }
}

pub struct CsvReportAdapter {
    picks_path: PathBuf,
    universe_path: PathBuf,
}

impl CsvReportAdapter {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(picks_path: P, universe_path: Q) -> Self {
        Self {
            picks_path: picks_path.into(),
            universe_path: universe_path.into(),
        }
    }

    /// Adapter writing `selected_portfolio_<stamp>.csv` and
    /// `universe_metrics_<stamp>.csv` into `dir`.
    pub fn in_dir(dir: &Path, stamp: &str) -> Self {
        Self::new(
            dir.join(format!("selected_portfolio_{}.csv", stamp)),
            dir.join(format!("universe_metrics_{}.csv", stamp)),
        )
    }

    pub fn picks_path(&self) -> &Path {
        &self.picks_path
    }

    pub fn universe_path(&self) -> &Path {
        &self.universe_path
    }

    fn write_rows<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<(), SleeveError> {
        let mut wtr = csv::Writer::from_path(path)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_picks(&self, picks: &[Pick]) -> Result<(), SleeveError> {
        Self::write_rows(&self.picks_path, picks.iter().map(PickRow::from))
    }

    fn write_universe(&self, universe: &[ScoredCandidate]) -> Result<(), SleeveError> {
        Self::write_rows(&self.universe_path, universe.iter().map(UniverseRow::from))
    }
}
