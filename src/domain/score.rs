//! Multi-factor composite scoring.
//!
//! Four factor groups are summed after scaling by their share of the total:
//! value 40%, momentum 30%, quality 20%, risk/balance 10%. Absent inputs add
//! nothing; the only penalty is a flat -0.1 when beta is unusable.

use super::sleeve::SleeveRules;
use super::snapshot::MetricsSnapshot;

pub const VALUE_SHARE: f64 = 0.4;
pub const MOMENTUM_SHARE: f64 = 0.3;
pub const QUALITY_SHARE: f64 = 0.2;
pub const RISK_SHARE: f64 = 0.1;

const PE_SCALE: f64 = 50.0;
const PB_SCALE: f64 = 10.0;
const MISSING_BETA_PENALTY: f64 = -0.1;
/// Largest magnitude any single term may contribute.
pub const TERM_CAP: f64 = 1.0e6;

/// Group subtotals, each already multiplied by its share.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub value: f64,
    pub momentum: f64,
    pub quality: f64,
    pub risk: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.value + self.momentum + self.quality + self.risk
    }
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x > 0.0)
}

// Tiny denominators and huge inputs would otherwise overflow to infinity.
fn capped(term: f64) -> f64 {
    if term.is_nan() {
        0.0
    } else {
        term.clamp(-TERM_CAP, TERM_CAP)
    }
}

pub fn score(metrics: &MetricsSnapshot, rules: &SleeveRules) -> f64 {
    score_breakdown(metrics, rules).total()
}

pub fn score_breakdown(metrics: &MetricsSnapshot, rules: &SleeveRules) -> ScoreBreakdown {
    ScoreBreakdown {
        value: value_group(metrics, rules) * VALUE_SHARE,
        momentum: momentum_group(metrics) * MOMENTUM_SHARE,
        quality: quality_group(metrics, rules) * QUALITY_SHARE,
        risk: risk_group(metrics, rules),
    }
}

fn value_group(m: &MetricsSnapshot, rules: &SleeveRules) -> f64 {
    let mut total = 0.0;
    if let Some(pe) = positive(m.pe_used()) {
        total += capped(rules.w_pe * (PE_SCALE / pe));
    }
    if let Some(pb) = positive(m.price_to_book) {
        total += capped(PB_SCALE / pb);
    }
    if let Some(div) = positive(m.dividend_yield) {
        total += capped(rules.w_div * (100.0 * div));
    }
    total
}

fn momentum_group(m: &MetricsSnapshot) -> f64 {
    // Signed: a 10% three-month gain is worth 1.0, a loss subtracts.
    m.return_3m.map_or(0.0, |r| capped(r / 10.0))
        + m.return_6m.map_or(0.0, |r| capped(r / 20.0))
        + m.proximity_52w.map_or(0.0, |p| capped(p / 20.0))
}

fn quality_group(m: &MetricsSnapshot, rules: &SleeveRules) -> f64 {
    let mut total = 0.0;
    if let Some(roe) = positive(m.return_on_equity) {
        total += capped(rules.w_quality * (5.0 * roe));
    }
    if let Some(pm) = positive(m.profit_margin) {
        total += capped(rules.w_quality * (5.0 * pm));
    }
    if let Some(growth) = positive(m.revenue_growth) {
        total += capped(growth * 10.0);
    }
    total
}

// The missing-beta penalty is applied as-is, outside the group share.
fn risk_group(m: &MetricsSnapshot, rules: &SleeveRules) -> f64 {
    let mut total = match positive(m.beta) {
        Some(beta) => capped(rules.w_risk * (2.0 / beta)) * RISK_SHARE,
        None => MISSING_BETA_PENALTY,
    };
    if let Some(dte) = m.debt_to_equity.filter(|d| *d >= 0.0) {
        total += capped(rules.w_balance * (5.0 / (1.0 + dte))) * RISK_SHARE;
    }
    total
}
