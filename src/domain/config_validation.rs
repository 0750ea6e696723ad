//! Configuration validation.
//!
//! Validates every config field before any metrics are fetched.

use crate::domain::error::SleeveError;
use crate::domain::sleeve::SleeveDefinition;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use tracing::warn;

pub const PORTFOLIO_SECTION: &str = "portfolio";
pub const SCREEN_SECTION: &str = "screen";
pub const DEFAULT_PICKS: i64 = 12;

const WEIGHT_KEYS: [&str; 5] = ["w_pe", "w_quality", "w_balance", "w_risk", "w_div"];

pub fn sleeve_section(sleeve: &str) -> String {
    format!("sleeve.{}", sleeve)
}

/// Sleeve ids listed in `[portfolio] sleeves`, lowercased in listed order.
pub fn sleeve_ids(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_list(PORTFOLIO_SECTION, "sleeves")
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect()
}

/// Parses an optional numeric key. Absent or blank is `None`; anything else
/// must be a finite number.
pub fn optional_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, SleeveError> {
    match config.get_non_empty(section, key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(SleeveError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a number, got {:?}", raw),
            }),
        },
    }
}

/// Raw pick count for a sleeve section: its own `picks`, else
/// `[portfolio] default_picks`, else [`DEFAULT_PICKS`].
pub fn resolve_picks(config: &dyn ConfigPort, section: &str) -> i64 {
    let default_picks = config.get_int(PORTFOLIO_SECTION, "default_picks", DEFAULT_PICKS);
    config.get_int(section, "picks", default_picks)
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), SleeveError> {
    validate_sleeve_list(config)?;
    validate_default_picks(config)?;
    validate_screen_config(config)?;
    for sleeve in sleeve_ids(config) {
        validate_sleeve(config, &sleeve)?;
    }
    Ok(())
}

fn validate_sleeve_list(config: &dyn ConfigPort) -> Result<(), SleeveError> {
    let ids = sleeve_ids(config);
    if ids.is_empty() {
        return Err(SleeveError::ConfigMissing {
            section: PORTFOLIO_SECTION.to_string(),
            key: "sleeves".to_string(),
        });
    }
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(SleeveError::ConfigInvalid {
                section: PORTFOLIO_SECTION.to_string(),
                key: "sleeves".to_string(),
                reason: format!("sleeve {} listed more than once", id),
            });
        }
    }
    Ok(())
}

fn validate_default_picks(config: &dyn ConfigPort) -> Result<(), SleeveError> {
    if config.get_int(PORTFOLIO_SECTION, "default_picks", DEFAULT_PICKS) < 1 {
        return Err(SleeveError::ConfigInvalid {
            section: PORTFOLIO_SECTION.to_string(),
            key: "default_picks".to_string(),
            reason: "default_picks must be at least 1".to_string(),
        });
    }
    Ok(())
}

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), SleeveError> {
    let pe_min = optional_double(config, SCREEN_SECTION, "pe_min")?;
    let pe_max = optional_double(config, SCREEN_SECTION, "pe_max")?;
    optional_double(config, SCREEN_SECTION, "debt_to_equity_max")?;
    optional_double(config, SCREEN_SECTION, "min_return_on_equity")?;

    if let (Some(min), Some(max)) = (pe_min, pe_max) {
        if min >= max {
            return Err(SleeveError::ConfigInvalid {
                section: SCREEN_SECTION.to_string(),
                key: "pe_min".to_string(),
                reason: "pe_min must be below pe_max".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_sleeve(config: &dyn ConfigPort, sleeve: &str) -> Result<(), SleeveError> {
    let section = sleeve_section(sleeve);

    let weight = optional_double(config, &section, "weight")?.ok_or_else(|| {
        SleeveError::ConfigMissing {
            section: section.clone(),
            key: "weight".to_string(),
        }
    })?;
    if weight < 0.0 {
        return Err(SleeveError::ConfigInvalid {
            section,
            key: "weight".to_string(),
            reason: "weight must be non-negative".to_string(),
        });
    }

    let tickers = config
        .get_string(&section, "tickers")
        .ok_or_else(|| SleeveError::ConfigMissing {
            section: section.clone(),
            key: "tickers".to_string(),
        })?;
    parse_tickers(&tickers).map_err(|source| SleeveError::Universe {
        sleeve: sleeve.to_string(),
        source,
    })?;

    if resolve_picks(config, &section) < 1 {
        return Err(SleeveError::ConfigInvalid {
            section,
            key: "picks".to_string(),
            reason: "picks must be at least 1".to_string(),
        });
    }

    for key in ["max_pe", "max_beta"] {
        if let Some(v) = optional_double(config, &section, key)? {
            if v <= 0.0 {
                return Err(SleeveError::ConfigInvalid {
                    section,
                    key: key.to_string(),
                    reason: format!("{} must be positive", key),
                });
            }
        }
    }

    for key in WEIGHT_KEYS {
        if let Some(v) = optional_double(config, &section, key)? {
            if v < 0.0 {
                return Err(SleeveError::ConfigInvalid {
                    section,
                    key: key.to_string(),
                    reason: format!("{} must be non-negative", key),
                });
            }
        }
    }

    Ok(())
}

/// Sum of sleeve target weights. A total away from 1.0 is only warned about;
/// the final normalization absorbs it.
pub fn check_weight_total(sleeves: &[SleeveDefinition]) -> f64 {
    let total: f64 = sleeves.iter().map(|s| s.target_weight).sum();
    if (total - 1.0).abs() > 1e-6 {
        warn!(total, "sleeve target weights do not sum to 1.0; picks will be renormalized");
    }
    total
}
