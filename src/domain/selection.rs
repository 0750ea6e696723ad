//! Per-sleeve selection and equal-weight allocation.
//!
//! Candidates are split into a composite-instrument pool and a
//! single-issuer pool. Each pool prefers screen-passing names by descending
//! score and falls back to the best scores regardless of screen when too few
//! pass. Pools never backfill each other.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::error::SleeveError;
use super::portfolio::{Pick, ScoredCandidate};
use super::sleeve::SleeveDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// Basket instruments such as index ETFs.
    Composite,
    SingleIssuer,
}

impl InstrumentKind {
    pub fn is_composite(self) -> bool {
        self == InstrumentKind::Composite
    }
}

/// Static knowledge needed to classify tickers for selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionPolicy {
    composites: HashSet<String>,
}

impl SelectionPolicy {
    pub fn new<I, S>(composites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            composites: composites.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind_of(&self, ticker: &str) -> InstrumentKind {
        if self.composites.contains(ticker) {
            InstrumentKind::Composite
        } else {
            InstrumentKind::SingleIssuer
        }
    }

    /// Composite and single-issuer member counts of a ticker list.
    pub fn member_counts(&self, tickers: &[String]) -> (usize, usize) {
        let composite = tickers
            .iter()
            .filter(|t| self.kind_of(t).is_composite())
            .count();
        (composite, tickers.len() - composite)
    }
}

/// Splits a sleeve's pick count between the composite and single-issuer pools.
///
/// The count is split evenly and an odd count gives the extra slot to
/// single issuers, unless that pool has no members and the composite pool
/// does. A short pool is not backfilled.
pub fn pool_targets(pick_count: usize, composites: usize, singles: usize) -> (usize, usize) {
    let half = pick_count / 2;
    if singles == 0 && composites > 0 {
        (pick_count - half, half)
    } else {
        (half, pick_count - half)
    }
}

// Descending score; `sort_by` is stable so ties keep universe order.
fn by_score_desc(a: &&ScoredCandidate, b: &&ScoredCandidate) -> Ordering {
    b.score.total_cmp(&a.score)
}

fn select_pool<'a>(pool: &[&'a ScoredCandidate], target: usize) -> Vec<&'a ScoredCandidate> {
    let mut passing: Vec<&ScoredCandidate> =
        pool.iter().copied().filter(|c| c.screen.passed).collect();
    passing.sort_by(by_score_desc);
    if passing.len() >= target {
        passing.truncate(target);
        return passing;
    }

    let mut everyone = pool.to_vec();
    everyone.sort_by(by_score_desc);
    everyone.truncate(target);
    everyone
}

/// Selects a sleeve's picks from the universe table.
///
/// The returned weights split the sleeve's target weight evenly and are not
/// yet normalized across the whole portfolio.
pub fn select(sleeve: &SleeveDefinition, table: &[ScoredCandidate]) -> Result<Vec<Pick>, SleeveError> {
    let (composites, singles): (Vec<&ScoredCandidate>, Vec<&ScoredCandidate>) = table
        .iter()
        .filter(|c| c.sleeve == sleeve.id)
        .partition(|c| c.kind.is_composite());
    if composites.is_empty() && singles.is_empty() {
        return Err(SleeveError::EmptySleeve {
            sleeve: sleeve.id.clone(),
        });
    }

    let (composite_target, single_target) =
        pool_targets(sleeve.pick_count, composites.len(), singles.len());
    let mut chosen = select_pool(&composites, composite_target);
    chosen.extend(select_pool(&singles, single_target));
    if chosen.is_empty() {
        return Ok(Vec::new());
    }

    let per_pick = sleeve.target_weight / chosen.len() as f64;
    Ok(chosen
        .into_iter()
        .map(|c| Pick {
            candidate: c.clone(),
            target_weight: per_pick,
        })
        .collect())
}
