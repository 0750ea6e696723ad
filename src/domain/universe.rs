//! Ticker universe parsing.
//!
//! Each sleeve lists its member tickers as a comma-separated string in
//! configuration. The same ticker may appear in several sleeves but only
//! once within a sleeve.

use crate::domain::sleeve::SleeveDefinition;
use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("ticker list is empty")]
    Empty,
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    if input.trim().is_empty() {
        return Err(UniverseError::Empty);
    }

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    // Trailing commas are tolerated; empty tokens elsewhere are not.
    let tokens: Vec<&str> = input.trim().trim_end_matches(',').split(',').collect();
    for token in tokens {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Distinct tickers across all sleeves, in first-seen order.
pub fn distinct_tickers(sleeves: &[SleeveDefinition]) -> Vec<String> {
    let mut seen = HashSet::new();
    sleeves
        .iter()
        .flat_map(|s| s.tickers.iter())
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}
