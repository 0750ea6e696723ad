//! CSV snapshot metrics adapter.
//!
//! Reads one row per ticker from a metrics file and serves them through
//! [`MetricsPort`]. Blank, unparsable and non-finite cells become absent
//! values. Column names accept both snake_case and the camelCase spelling
//! used by common market-data exports (`trailingPE`, `dividendYield`, ...).

use crate::domain::error::SleeveError;
use crate::domain::snapshot::MetricsSnapshot;
use crate::ports::metrics_port::MetricsPort;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct MetricsRow {
    #[serde(alias = "symbol")]
    ticker: String,
    #[serde(default, alias = "trailingPE", deserialize_with = "csv::invalid_option")]
    trailing_pe: Option<f64>,
    #[serde(default, alias = "forwardPE", deserialize_with = "csv::invalid_option")]
    forward_pe: Option<f64>,
    #[serde(default, alias = "profitMargins", deserialize_with = "csv::invalid_option")]
    profit_margin: Option<f64>,
    #[serde(default, alias = "returnOnEquity", deserialize_with = "csv::invalid_option")]
    return_on_equity: Option<f64>,
    #[serde(default, alias = "debtToEquity", deserialize_with = "csv::invalid_option")]
    debt_to_equity: Option<f64>,
    #[serde(default, alias = "marketCap", deserialize_with = "csv::invalid_option")]
    market_cap: Option<f64>,
    #[serde(default, alias = "dividendYield", deserialize_with = "csv::invalid_option")]
    dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    beta: Option<f64>,
    #[serde(default, alias = "priceToBook", deserialize_with = "csv::invalid_option")]
    price_to_book: Option<f64>,
    #[serde(default, alias = "pegRatio", deserialize_with = "csv::invalid_option")]
    peg_ratio: Option<f64>,
    #[serde(default, alias = "revenueGrowth", deserialize_with = "csv::invalid_option")]
    revenue_growth: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    return_3m: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    return_6m: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    proximity_52w: Option<f64>,
}

impl From<MetricsRow> for MetricsSnapshot {
    fn from(row: MetricsRow) -> Self {
        MetricsSnapshot {
            ticker: row.ticker.trim().to_uppercase(),
            trailing_pe: row.trailing_pe,
            forward_pe: row.forward_pe,
            profit_margin: row.profit_margin,
            return_on_equity: row.return_on_equity,
            debt_to_equity: row.debt_to_equity,
            market_cap: row.market_cap,
            dividend_yield: row.dividend_yield,
            beta: row.beta,
            price_to_book: row.price_to_book,
            peg_ratio: row.peg_ratio,
            revenue_growth: row.revenue_growth,
            return_3m: row.return_3m,
            return_6m: row.return_6m,
            proximity_52w: row.proximity_52w,
        }
        .sanitized()
    }
}

pub struct CsvMetricsAdapter {
    snapshots: HashMap<String, MetricsSnapshot>,
}

impl CsvMetricsAdapter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SleeveError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| SleeveError::Provider {
            ticker: "*".to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let adapter = Self::from_reader(file)?;
        debug!(path = %path.display(), tickers = adapter.len(), "loaded metrics file");
        Ok(adapter)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SleeveError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut snapshots = HashMap::new();

        for result in rdr.deserialize::<MetricsRow>() {
            let snapshot = MetricsSnapshot::from(result?);
            if snapshot.ticker.is_empty() {
                continue;
            }
            if snapshots.contains_key(&snapshot.ticker) {
                warn!(ticker = %snapshot.ticker, "duplicate metrics row, keeping the last one");
            }
            snapshots.insert(snapshot.ticker.clone(), snapshot);
        }

        Ok(Self { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl MetricsPort for CsvMetricsAdapter {
    fn fetch(&self, ticker: &str) -> Result<MetricsSnapshot, SleeveError> {
        self.snapshots
            .get(&ticker.to_uppercase())
            .cloned()
            .ok_or_else(|| SleeveError::NoMetrics {
                ticker: ticker.to_string(),
            })
    }
}
