#![allow(dead_code)]

use sleevebuilder::domain::error::SleeveError;
use sleevebuilder::domain::portfolio::PortfolioConfig;
use sleevebuilder::domain::selection::SelectionPolicy;
use sleevebuilder::domain::sleeve::{RuleBook, SleeveDefinition, SleeveRules};
pub use sleevebuilder::domain::snapshot::MetricsSnapshot;
use sleevebuilder::ports::metrics_port::MetricsPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// Metrics provider backed by in-memory snapshots. Unknown tickers return
/// `NoMetrics`; every call is recorded.
pub struct MockMetricsPort {
    pub data: HashMap<String, MetricsSnapshot>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockMetricsPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_snapshot(mut self, snapshot: MetricsSnapshot) -> Self {
        self.data.insert(snapshot.ticker.clone(), snapshot);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self, ticker: &str) -> usize {
        self.calls.borrow().iter().filter(|t| *t == ticker).count()
    }
}

impl MetricsPort for MockMetricsPort {
    fn fetch(&self, ticker: &str) -> Result<MetricsSnapshot, SleeveError> {
        self.calls.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SleeveError::Provider {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(ticker)
            .cloned()
            .ok_or_else(|| SleeveError::NoMetrics {
                ticker: ticker.to_string(),
            })
    }
}

/// Snapshot with a trailing P/E, beta and dividend yield; everything else absent.
pub fn make_snapshot(ticker: &str, pe: f64, beta: f64, div: f64) -> MetricsSnapshot {
    MetricsSnapshot {
        trailing_pe: Some(pe),
        beta: Some(beta),
        dividend_yield: Some(div),
        ..MetricsSnapshot::absent(ticker)
    }
}

pub fn make_sleeve(id: &str, weight: f64, tickers: &[&str], picks: usize) -> SleeveDefinition {
    SleeveDefinition {
        id: id.to_string(),
        target_weight: weight,
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        pick_count: picks,
    }
}

pub fn energy_rules() -> SleeveRules {
    SleeveRules {
        max_pe: Some(25.0),
        max_beta: Some(1.6),
        w_pe: 1.8,
        w_quality: 0.6,
        w_balance: 0.8,
        w_risk: 0.3,
        w_div: 0.4,
    }
}

pub fn make_config(sleeves: Vec<SleeveDefinition>, composites: &[&str]) -> PortfolioConfig {
    PortfolioConfig {
        sleeves,
        rules: RuleBook::new().with_rules("energy", energy_rules()),
        policy: SelectionPolicy::new(composites.iter().copied()),
        ..PortfolioConfig::default()
    }
}
