//! Short human-readable notes on why a pick looks attractive.

use super::portfolio::Pick;

pub const ATTRACTIVE_PE: f64 = 20.0;
pub const NOTABLE_YIELD: f64 = 0.02;

pub fn why_picked(pick: &Pick) -> Vec<String> {
    let c = &pick.candidate;
    let mut notes = Vec::new();
    if c.screen.passed {
        notes.push("passed all screening criteria".to_string());
    }
    if let Some(pe) = c.pe_used().filter(|pe| *pe < ATTRACTIVE_PE) {
        notes.push(format!("attractive valuation (PE: {:.1})", pe));
    }
    if let Some(div) = c.metrics.dividend_yield.filter(|d| *d > NOTABLE_YIELD) {
        notes.push(format!("dividend yield: {:.1}%", div * 100.0));
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::ScoredCandidate;
    use crate::domain::screen::ScreenResult;
    use crate::domain::selection::InstrumentKind;
    use crate::domain::snapshot::MetricsSnapshot;

    fn pick(metrics: MetricsSnapshot, passed: bool) -> Pick {
        Pick {
            candidate: ScoredCandidate {
                sleeve: "value_hedge".into(),
                kind: InstrumentKind::SingleIssuer,
                metrics,
                screen: ScreenResult {
                    passed,
                    reasons: if passed { vec![] } else { vec!["PE>25".into()] },
                },
                score: 1.0,
            },
            target_weight: 0.01,
        }
    }

    #[test]
    fn cheap_high_yield_passing_pick_gets_all_notes() {
        let m = MetricsSnapshot {
            trailing_pe: Some(14.3),
            dividend_yield: Some(0.031),
            ..MetricsSnapshot::absent("KO")
        };
        assert_eq!(
            why_picked(&pick(m, true)),
            vec![
                "passed all screening criteria".to_string(),
                "attractive valuation (PE: 14.3)".to_string(),
                "dividend yield: 3.1%".to_string(),
            ]
        );
    }

    #[test]
    fn fallback_pick_without_data_has_no_notes() {
        assert!(why_picked(&pick(MetricsSnapshot::absent("VOO"), false)).is_empty());
    }
}
