//! CLI integration tests for config resolution and the build command.
//!
//! Tests cover:
//! - Config resolution (build_screen_config, build_sleeves, build_rule_book)
//! - Validation failures surfacing as config errors
//! - Dry-run mode with real INI files on disk
//! - Full pipeline with MockMetricsPort writing CSVs into a temp directory
//! - Full pipeline with the CSV metrics adapter

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use sleevebuilder::adapters::csv_metrics_adapter::CsvMetricsAdapter;
use sleevebuilder::adapters::file_config_adapter::FileConfigAdapter;
use sleevebuilder::cli;
use sleevebuilder::domain::config_validation::validate_portfolio_config;
use sleevebuilder::domain::error::SleeveError;
use sleevebuilder::domain::selection::InstrumentKind;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

// ExitCode has no PartialEq; compare through its Debug output.
fn exit_report(code: ExitCode) -> String {
    format!("{code:?}")
}

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[portfolio]
sleeves = anchor, energy
composite_tickers = voo, XLE
default_picks = 4

[screen]
pe_min = 5
pe_max = 30
require_positive_profit_margin = false
debt_to_equity_max = 2.5
min_return_on_equity =
allow_missing_fields = true

[sleeve.anchor]
weight = 0.7
tickers = VOO, AAPL, MSFT
picks = 2
max_pe = 35

[sleeve.Energy]
weight = 0.3
tickers = XLE, XOM, CVX, COP
max_pe = 25
max_beta = 1.6
w_pe = 1.8
w_div = 0.4
"#;

const METRICS_CSV: &str = "ticker,trailingPE,forwardPE,dividendYield,beta,debtToEquity\n\
    VOO,24.0,,0.013,1.0,\n\
    AAPL,29.0,27.0,0.005,1.2,1.5\n\
    MSFT,33.0,30.0,0.007,0.9,0.4\n\
    XLE,16.0,,0.032,1.0,\n\
    XOM,18.0,,0.03,1.1,0.2\n\
    CVX,14.0,,0.04,1.2,0.15\n\
    COP,150.0,,0.01,1.3,0.4\n";

mod config_loading {
    use super::*;

    #[test]
    fn build_screen_config_reads_all_keys() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let screen = cli::build_screen_config(&adapter).unwrap();

        assert_abs_diff_eq!(screen.pe_min, 5.0);
        assert_abs_diff_eq!(screen.pe_max, 30.0);
        assert!(!screen.require_positive_profit_margin);
        assert_eq!(screen.debt_to_equity_max, Some(2.5));
        assert_eq!(screen.min_return_on_equity, None);
        assert!(screen.allow_missing_fields);
    }

    #[test]
    fn build_screen_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[portfolio]\nsleeves = anchor\n").unwrap();
        let screen = cli::build_screen_config(&adapter).unwrap();

        assert_abs_diff_eq!(screen.pe_min, 5.0);
        assert_abs_diff_eq!(screen.pe_max, 30.0);
        assert!(screen.require_positive_profit_margin);
        assert_eq!(screen.debt_to_equity_max, None);
        assert!(screen.allow_missing_fields);
    }

    #[test]
    fn build_sleeves_keeps_listed_order_and_default_picks() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let sleeves = cli::build_sleeves(&adapter).unwrap();

        assert_eq!(sleeves.len(), 2);
        assert_eq!(sleeves[0].id, "anchor");
        assert_eq!(sleeves[0].pick_count, 2);
        assert_eq!(sleeves[0].tickers, vec!["VOO", "AAPL", "MSFT"]);
        assert_eq!(sleeves[1].id, "energy");
        assert_eq!(sleeves[1].pick_count, 4);
        assert_abs_diff_eq!(sleeves[1].target_weight, 0.3);
    }

    #[test]
    fn build_rule_book_applies_overrides_and_defaults() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let book = cli::build_rule_book(&adapter).unwrap();

        let energy = book.rules_for("energy");
        assert_eq!(energy.max_pe, Some(25.0));
        assert_eq!(energy.max_beta, Some(1.6));
        assert_abs_diff_eq!(energy.w_pe, 1.8);
        assert_abs_diff_eq!(energy.w_div, 0.4);
        assert_abs_diff_eq!(energy.w_quality, 0.7);

        let anchor = book.rules_for("anchor");
        assert_eq!(anchor.max_beta, None);
        assert_abs_diff_eq!(anchor.w_pe, 1.0);
    }

    #[test]
    fn build_portfolio_config_uppercases_composites() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_portfolio_config(&adapter).unwrap();

        assert_eq!(config.policy.kind_of("VOO"), InstrumentKind::Composite);
        assert_eq!(config.policy.kind_of("XLE"), InstrumentKind::Composite);
        assert_eq!(config.policy.kind_of("XOM"), InstrumentKind::SingleIssuer);
    }

    #[test]
    fn missing_weight_is_config_missing() {
        let ini = "[portfolio]\nsleeves = anchor\n[sleeve.anchor]\ntickers = VOO\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_sleeves(&adapter).unwrap_err();
        assert!(matches!(err, SleeveError::ConfigMissing { key, .. } if key == "weight"));
    }

    #[test]
    fn validated_picks_match_built_picks() {
        let ini = "[portfolio]\nsleeves = anchor, growth\ndefault_picks = 3\n\
                   [sleeve.anchor]\nweight = 0.5\ntickers = VOO, AAPL\n\
                   [sleeve.growth]\nweight = 0.5\ntickers = NVDA\npicks = lots\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        validate_portfolio_config(&adapter).unwrap();
        let sleeves = cli::build_sleeves(&adapter).unwrap();
        assert_eq!(sleeves[0].pick_count, 3);
        assert_eq!(sleeves[1].pick_count, 3);
    }

    #[test]
    fn duplicate_ticker_fails_validation() {
        let ini = "[portfolio]\nsleeves = anchor\n[sleeve.anchor]\nweight = 1\ntickers = VOO, voo\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = validate_portfolio_config(&adapter).unwrap_err();
        assert!(matches!(err, SleeveError::Universe { .. }));
        assert!(exit_report(ExitCode::from(&err)).contains("(2)"));
    }
}

mod explain_target {
    use super::*;

    fn config() -> sleevebuilder::domain::portfolio::PortfolioConfig {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        cli::build_portfolio_config(&adapter).unwrap()
    }

    #[test]
    fn member_ticker_is_accepted() {
        assert!(cli::check_explain_target(&config(), "Energy", "xom").is_ok());
    }

    #[test]
    fn ticker_from_another_sleeve_is_rejected() {
        let err = cli::check_explain_target(&config(), "energy", "AAPL").unwrap_err();
        assert!(matches!(
            &err,
            SleeveError::ConfigInvalid { section, key, .. }
                if section == "sleeve.energy" && key == "tickers"
        ));
        assert!(exit_report(ExitCode::from(&err)).contains("(2)"));
    }

    #[test]
    fn unknown_sleeve_is_rejected() {
        let err = cli::check_explain_target(&config(), "crypto", "BTC").unwrap_err();
        assert!(matches!(err, SleeveError::ConfigInvalid { key, .. } if key == "sleeves"));
    }
}

mod dry_run {
    use super::*;

    #[test]
    fn dry_run_valid_config_succeeds() {
        let file = write_temp_ini(VALID_INI);
        let report = exit_report(cli::run_dry_run(file.path()));
        assert!(report.contains("(0)"), "expected success exit code, got: {report}");
    }

    #[test]
    fn dry_run_invalid_config_fails() {
        let file = write_temp_ini("[portfolio]\nsleeves =\n");
        let report = exit_report(cli::run_dry_run(file.path()));
        assert!(report.contains("(2)"), "expected config error exit code, got: {report}");
    }

    #[test]
    fn dry_run_missing_file_fails() {
        let path = std::path::Path::new("/nonexistent/portfolio.ini");
        let report = exit_report(cli::run_dry_run(path));
        assert!(!report.contains("(0)"), "expected error exit code for missing file");
    }
}

mod full_pipeline {
    use super::*;

    fn mock_port() -> MockMetricsPort {
        MockMetricsPort::new()
            .with_snapshot(make_snapshot("VOO", 24.0, 1.0, 0.013))
            .with_snapshot(make_snapshot("AAPL", 29.0, 1.2, 0.005))
            .with_snapshot(make_snapshot("MSFT", 33.0, 0.9, 0.007))
            .with_snapshot(make_snapshot("XLE", 16.0, 1.0, 0.032))
            .with_snapshot(make_snapshot("XOM", 18.0, 1.1, 0.03))
            .with_snapshot(make_snapshot("CVX", 14.0, 1.2, 0.04))
            .with_error("COP", "connection reset")
    }

    #[test]
    fn pipeline_writes_both_artifacts() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_portfolio_config(&adapter).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("reports");

        let (outcome, report) =
            cli::run_build_pipeline(&mock_port(), &config, &out, "2026-03-02_09-30").unwrap();

        assert!(report
            .picks_path()
            .ends_with("selected_portfolio_2026-03-02_09-30.csv"));
        assert!(report
            .universe_path()
            .ends_with("universe_metrics_2026-03-02_09-30.csv"));

        let picks_csv = fs::read_to_string(report.picks_path()).unwrap();
        assert_eq!(picks_csv.lines().count(), outcome.picks.len() + 1);

        let universe_csv = fs::read_to_string(report.universe_path()).unwrap();
        assert_eq!(universe_csv.lines().count(), 7 + 1);

        assert_abs_diff_eq!(outcome.total_weight(), 1.0, epsilon = 1e-9);
        assert_eq!(outcome.fetch_failures.len(), 1);
        assert_eq!(outcome.fetch_failures[0].ticker, "COP");
    }

    #[test]
    fn pipeline_respects_pool_split() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_portfolio_config(&adapter).unwrap();
        let dir = tempfile::TempDir::new().unwrap();

        let (outcome, _) =
            cli::run_build_pipeline(&mock_port(), &config, dir.path(), "stamp").unwrap();

        // anchor: 1 composite + 1 single; energy: 1 composite (no backfill) + 2 single
        assert_eq!(outcome.picks_for("anchor").count(), 2);
        assert_eq!(outcome.picks_for("energy").count(), 3);

        let anchor: f64 = outcome.picks_for("anchor").map(|p| p.target_weight).sum();
        assert_abs_diff_eq!(anchor, 0.7, epsilon = 1e-9);
    }

    #[test]
    fn single_composite_sleeve_with_one_pick_is_filled() {
        let ini = "[portfolio]\nsleeves = international\ncomposite_tickers = VXUS\n\
                   [sleeve.international]\nweight = 1.0\ntickers = VXUS\npicks = 1\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        validate_portfolio_config(&adapter).unwrap();
        let config = cli::build_portfolio_config(&adapter).unwrap();
        let port = MockMetricsPort::new().with_snapshot(make_snapshot("VXUS", 15.0, 0.9, 0.03));
        let dir = tempfile::TempDir::new().unwrap();

        let (outcome, _) = cli::run_build_pipeline(&port, &config, dir.path(), "intl").unwrap();

        assert_eq!(outcome.picks.len(), 1);
        assert_eq!(outcome.picks[0].ticker(), "VXUS");
        assert_abs_diff_eq!(outcome.total_weight(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn pipeline_with_csv_metrics_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let metrics_path = dir.path().join("metrics.csv");
        fs::write(&metrics_path, METRICS_CSV).unwrap();

        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_portfolio_config(&adapter).unwrap();
        let provider = CsvMetricsAdapter::from_path(&metrics_path).unwrap();

        let (outcome, report) =
            cli::run_build_pipeline(&provider, &config, dir.path(), "csv").unwrap();

        assert!(outcome.fetch_failures.is_empty());
        assert!(outcome.picks.iter().all(|p| p.ticker() != "COP"));

        let mut rdr = csv::Reader::from_path(report.picks_path()).unwrap();
        let sleeves: Vec<String> = rdr
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        let mut sorted = sleeves.clone();
        sorted.sort();
        assert_eq!(sleeves, sorted);
    }
}
