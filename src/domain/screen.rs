//! Guardrail screening.
//!
//! Each check follows the same pattern: a present value is evaluated, an
//! absent value is rejected when missing fields are not tolerated, and is
//! skipped otherwise. Screening never fails; every outcome is encoded in the
//! returned [`ScreenResult`].

use super::sleeve::SleeveRules;
use super::snapshot::MetricsSnapshot;

pub const DEFAULT_PE_MIN: f64 = 5.0;
pub const DEFAULT_PE_MAX: f64 = 30.0;

/// Global screening defaults. The P/E and beta ceilings can be overridden per sleeve.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub pe_min: f64,
    pub pe_max: f64,
    pub require_positive_profit_margin: bool,
    pub debt_to_equity_max: Option<f64>,
    pub min_return_on_equity: Option<f64>,
    pub allow_missing_fields: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            pe_min: DEFAULT_PE_MIN,
            pe_max: DEFAULT_PE_MAX,
            require_positive_profit_margin: true,
            debt_to_equity_max: None,
            min_return_on_equity: None,
            allow_missing_fields: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScreenResult {
    pub passed: bool,
    pub reasons: Vec<String>,
}

impl ScreenResult {
    fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            passed: reasons.is_empty(),
            reasons,
        }
    }

    pub fn joined_reasons(&self) -> String {
        self.reasons.join("; ")
    }
}

pub fn screen(metrics: &MetricsSnapshot, rules: &SleeveRules, config: &ScreenConfig) -> ScreenResult {
    let mut reasons = Vec::new();
    let pe_max = rules.max_pe.unwrap_or(config.pe_max);
    let tolerant = config.allow_missing_fields;

    match metrics.pe_used() {
        None => {
            if !tolerant {
                reasons.push("missing PE (trailing/forward)".to_string());
            }
        }
        Some(pe) => {
            if pe < config.pe_min {
                reasons.push(format!("PE<{}", config.pe_min));
            }
            if pe > pe_max {
                reasons.push(format!("PE>{}", pe_max));
            }
        }
    }

    if config.require_positive_profit_margin {
        match metrics.profit_margin {
            None if !tolerant => reasons.push("missing profitMargins".to_string()),
            Some(pm) if pm <= 0.0 => reasons.push("profitMargins<=0".to_string()),
            _ => {}
        }
    }

    if let Some(max) = config.debt_to_equity_max {
        match metrics.debt_to_equity {
            None if !tolerant => reasons.push("missing debtToEquity".to_string()),
            Some(dte) if dte > max => reasons.push(format!("debtToEquity>{}", max)),
            _ => {}
        }
    }

    if let Some(min) = config.min_return_on_equity {
        match metrics.return_on_equity {
            None if !tolerant => reasons.push("missing returnOnEquity".to_string()),
            Some(roe) if roe < min => reasons.push(format!("returnOnEquity<{}", min)),
            _ => {}
        }
    }

    if let Some(max) = rules.max_beta {
        match metrics.beta {
            None if !tolerant => reasons.push("missing beta".to_string()),
            Some(beta) if beta > max => reasons.push(format!("beta>{}", max)),
            _ => {}
        }
    }

    ScreenResult::from_reasons(reasons)
}
