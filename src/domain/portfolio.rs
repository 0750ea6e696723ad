//! Portfolio assembly: fetch, screen, score, select, normalize.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::error::SleeveError;
use super::score::score;
use super::screen::{screen, ScreenConfig, ScreenResult};
use super::selection::{select, InstrumentKind, SelectionPolicy};
use super::sleeve::{RuleBook, SleeveDefinition};
use super::snapshot::MetricsSnapshot;
use crate::ports::metrics_port::MetricsPort;

/// One row of the universe table: a snapshot judged under one sleeve's rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub sleeve: String,
    pub kind: InstrumentKind,
    pub metrics: MetricsSnapshot,
    pub screen: ScreenResult,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn ticker(&self) -> &str {
        &self.metrics.ticker
    }

    pub fn pe_used(&self) -> Option<f64> {
        self.metrics.pe_used()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub candidate: ScoredCandidate,
    /// Fraction of the whole portfolio.
    pub target_weight: f64,
}

impl Pick {
    pub fn ticker(&self) -> &str {
        self.candidate.ticker()
    }

    pub fn sleeve(&self) -> &str {
        &self.candidate.sleeve
    }
}

/// Static inputs of a build, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct PortfolioConfig {
    pub sleeves: Vec<SleeveDefinition>,
    pub rules: RuleBook,
    pub screen: ScreenConfig,
    pub policy: SelectionPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Sorted by sleeve, then descending weight.
    pub picks: Vec<Pick>,
    /// Every candidate, sorted by sleeve, then descending score.
    pub universe: Vec<ScoredCandidate>,
    pub fetch_failures: Vec<FetchFailure>,
}

impl BuildOutcome {
    pub fn picks_for<'a>(&'a self, sleeve: &'a str) -> impl Iterator<Item = &'a Pick> + 'a {
        self.picks.iter().filter(move |p| p.sleeve() == sleeve)
    }

    pub fn total_weight(&self) -> f64 {
        self.picks.iter().map(|p| p.target_weight).sum()
    }
}

pub struct PortfolioBuilder<'a> {
    provider: &'a dyn MetricsPort,
    config: &'a PortfolioConfig,
    cache: HashMap<String, MetricsSnapshot>,
    failures: Vec<FetchFailure>,
}

impl<'a> PortfolioBuilder<'a> {
    pub fn new(provider: &'a dyn MetricsPort, config: &'a PortfolioConfig) -> Self {
        Self {
            provider,
            config,
            cache: HashMap::new(),
            failures: Vec::new(),
        }
    }

    /// Tickers listed in several sleeves are fetched once.
    fn snapshot(&mut self, ticker: &str) -> MetricsSnapshot {
        if let Some(cached) = self.cache.get(ticker) {
            return cached.clone();
        }
        let snapshot = match self.provider.fetch(ticker) {
            Ok(s) => s.sanitized(),
            Err(e) => {
                warn!(ticker, error = %e, "metrics fetch failed, treating all fields as absent");
                self.failures.push(FetchFailure {
                    ticker: ticker.to_string(),
                    reason: e.to_string(),
                });
                MetricsSnapshot::absent(ticker)
            }
        };
        self.cache.insert(ticker.to_string(), snapshot.clone());
        snapshot
    }

    pub fn universe_table(&mut self) -> Vec<ScoredCandidate> {
        let config = self.config;
        let mut table = Vec::new();
        for sleeve in &config.sleeves {
            let rules = config.rules.rules_for(&sleeve.id);
            for ticker in &sleeve.tickers {
                let metrics = self.snapshot(ticker);
                let screen = screen(&metrics, &rules, &config.screen);
                let score = score(&metrics, &rules);
                debug!(sleeve = %sleeve.id, ticker = %ticker, score, passed = screen.passed, "scored candidate");
                table.push(ScoredCandidate {
                    sleeve: sleeve.id.clone(),
                    kind: config.policy.kind_of(ticker),
                    metrics,
                    screen,
                    score,
                });
            }
        }
        table
    }

    pub fn build(mut self) -> Result<BuildOutcome, SleeveError> {
        let mut universe = self.universe_table();
        info!(
            candidates = universe.len(),
            fetched = self.cache.len(),
            failed = self.failures.len(),
            "universe table ready"
        );

        let mut picks = Vec::new();
        for sleeve in &self.config.sleeves {
            let sleeve_picks = select(sleeve, &universe)?;
            debug!(sleeve = %sleeve.id, picks = sleeve_picks.len(), "sleeve selected");
            picks.extend(sleeve_picks);
        }

        normalize_weights(&mut picks)?;

        picks.sort_by(|a, b| {
            a.sleeve()
                .cmp(b.sleeve())
                .then(b.target_weight.total_cmp(&a.target_weight))
        });
        universe.sort_by(|a, b| a.sleeve.cmp(&b.sleeve).then(b.score.total_cmp(&a.score)));

        Ok(BuildOutcome {
            picks,
            universe,
            fetch_failures: self.failures,
        })
    }
}

/// Builds the portfolio for every configured sleeve.
pub fn build(provider: &dyn MetricsPort, config: &PortfolioConfig) -> Result<BuildOutcome, SleeveError> {
    PortfolioBuilder::new(provider, config).build()
}

/// Rescales weights so all picks sum to 1.0.
pub fn normalize_weights(picks: &mut [Pick]) -> Result<(), SleeveError> {
    let total: f64 = picks.iter().map(|p| p.target_weight).sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(SleeveError::ZeroTotalWeight { total });
    }
    for pick in picks.iter_mut() {
        pick.target_weight /= total;
    }
    Ok(())
}
