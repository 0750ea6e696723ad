//! Sleeve definitions and their screening/scoring rules.

use std::collections::HashMap;

pub const DEFAULT_W_PE: f64 = 1.0;
pub const DEFAULT_W_QUALITY: f64 = 0.7;
pub const DEFAULT_W_BALANCE: f64 = 0.5;
pub const DEFAULT_W_RISK: f64 = 0.5;
pub const DEFAULT_W_DIV: f64 = 0.1;

/// Guardrails and factor weights for one sleeve.
///
/// `max_pe` of `None` defers to the global P/E ceiling; `max_beta` of `None`
/// disables the beta check.
#[derive(Debug, Clone, PartialEq)]
pub struct SleeveRules {
    pub max_pe: Option<f64>,
    pub max_beta: Option<f64>,
    pub w_pe: f64,
    pub w_quality: f64,
    pub w_balance: f64,
    pub w_risk: f64,
    pub w_div: f64,
}

impl Default for SleeveRules {
    fn default() -> Self {
        Self {
            max_pe: None,
            max_beta: None,
            w_pe: DEFAULT_W_PE,
            w_quality: DEFAULT_W_QUALITY,
            w_balance: DEFAULT_W_BALANCE,
            w_risk: DEFAULT_W_RISK,
            w_div: DEFAULT_W_DIV,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleeveDefinition {
    pub id: String,
    /// Fraction of the whole portfolio this sleeve should hold.
    pub target_weight: f64,
    pub tickers: Vec<String>,
    /// How many instruments to pick, split between composite and single-issuer pools.
    pub pick_count: usize,
}

/// Rule table keyed by sleeve id. Sleeves without an entry get the defaults.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: HashMap<String, SleeveRules>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, sleeve: &str, rules: SleeveRules) -> Self {
        self.insert(sleeve, rules);
        self
    }

    pub fn insert(&mut self, sleeve: &str, rules: SleeveRules) {
        self.rules.insert(sleeve.to_string(), rules);
    }

    pub fn rules_for(&self, sleeve: &str) -> SleeveRules {
        self.rules.get(sleeve).cloned().unwrap_or_default()
    }
}
