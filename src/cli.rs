//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_metrics_adapter::CsvMetricsAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    check_weight_total, optional_double, resolve_picks, sleeve_ids, sleeve_section,
    validate_portfolio_config, PORTFOLIO_SECTION, SCREEN_SECTION,
};
use crate::domain::error::SleeveError;
use crate::domain::portfolio::{self, BuildOutcome, PortfolioConfig};
use crate::domain::rationale::why_picked;
use crate::domain::score::score_breakdown;
use crate::domain::screen::{screen, ScreenConfig, DEFAULT_PE_MAX, DEFAULT_PE_MIN};
use crate::domain::selection::{pool_targets, SelectionPolicy};
use crate::domain::sleeve::{
    RuleBook, SleeveDefinition, SleeveRules, DEFAULT_W_BALANCE, DEFAULT_W_DIV, DEFAULT_W_PE,
    DEFAULT_W_QUALITY, DEFAULT_W_RISK,
};
use crate::domain::universe::{distinct_tickers, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::metrics_port::MetricsPort;
use crate::ports::report_port::ReportPort;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

#[derive(Parser, Debug)]
#[command(name = "sleevebuilder", about = "Rule-based sleeve portfolio builder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen, score and select every sleeve, then write the CSV artifacts
    Build {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        metrics: PathBuf,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a portfolio configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show how one ticker screens and scores under a sleeve's rules
    Explain {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        metrics: PathBuf,
        #[arg(long)]
        sleeve: String,
        #[arg(long)]
        ticker: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Build {
            config,
            metrics,
            output_dir,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_build(&config, &metrics, &output_dir)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Explain {
            config,
            metrics,
            sleeve,
            ticker,
        } => run_explain(&config, &metrics, &sleeve, &ticker),
    }
}

fn fail(err: SleeveError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(fail)
}

/// Loads and validates a config, then resolves it into a [`PortfolioConfig`].
fn load_portfolio_config(path: &Path) -> Result<PortfolioConfig, ExitCode> {
    let adapter = load_config(path)?;
    validate_portfolio_config(&adapter).map_err(fail)?;
    build_portfolio_config(&adapter).map_err(fail)
}

pub fn build_screen_config(adapter: &dyn ConfigPort) -> Result<ScreenConfig, SleeveError> {
    Ok(ScreenConfig {
        pe_min: optional_double(adapter, SCREEN_SECTION, "pe_min")?.unwrap_or(DEFAULT_PE_MIN),
        pe_max: optional_double(adapter, SCREEN_SECTION, "pe_max")?.unwrap_or(DEFAULT_PE_MAX),
        require_positive_profit_margin: adapter.get_bool(
            SCREEN_SECTION,
            "require_positive_profit_margin",
            true,
        ),
        debt_to_equity_max: optional_double(adapter, SCREEN_SECTION, "debt_to_equity_max")?,
        min_return_on_equity: optional_double(adapter, SCREEN_SECTION, "min_return_on_equity")?,
        allow_missing_fields: adapter.get_bool(SCREEN_SECTION, "allow_missing_fields", true),
    })
}

pub fn build_sleeves(adapter: &dyn ConfigPort) -> Result<Vec<SleeveDefinition>, SleeveError> {
    sleeve_ids(adapter)
        .into_iter()
        .map(|id| {
            let section = sleeve_section(&id);
            let target_weight = optional_double(adapter, &section, "weight")?.ok_or_else(|| {
                SleeveError::ConfigMissing {
                    section: section.clone(),
                    key: "weight".into(),
                }
            })?;
            let raw_tickers = adapter.get_string(&section, "tickers").unwrap_or_default();
            let tickers = parse_tickers(&raw_tickers).map_err(|source| SleeveError::Universe {
                sleeve: id.clone(),
                source,
            })?;
            let pick_count = usize::try_from(resolve_picks(adapter, &section))
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| SleeveError::ConfigInvalid {
                    section: section.clone(),
                    key: "picks".into(),
                    reason: "picks must be at least 1".into(),
                })?;

            Ok(SleeveDefinition {
                id,
                target_weight,
                tickers,
                pick_count,
            })
        })
        .collect()
}

pub fn build_rule_book(adapter: &dyn ConfigPort) -> Result<RuleBook, SleeveError> {
    let mut book = RuleBook::new();
    for id in sleeve_ids(adapter) {
        let section = sleeve_section(&id);
        let rules = SleeveRules {
            max_pe: optional_double(adapter, &section, "max_pe")?,
            max_beta: optional_double(adapter, &section, "max_beta")?,
            w_pe: optional_double(adapter, &section, "w_pe")?.unwrap_or(DEFAULT_W_PE),
            w_quality: optional_double(adapter, &section, "w_quality")?.unwrap_or(DEFAULT_W_QUALITY),
            w_balance: optional_double(adapter, &section, "w_balance")?.unwrap_or(DEFAULT_W_BALANCE),
            w_risk: optional_double(adapter, &section, "w_risk")?.unwrap_or(DEFAULT_W_RISK),
            w_div: optional_double(adapter, &section, "w_div")?.unwrap_or(DEFAULT_W_DIV),
        };
        book.insert(&id, rules);
    }
    Ok(book)
}

pub fn build_portfolio_config(adapter: &dyn ConfigPort) -> Result<PortfolioConfig, SleeveError> {
    let composites = adapter
        .get_list(PORTFOLIO_SECTION, "composite_tickers")
        .into_iter()
        .map(|t| t.to_uppercase());

    Ok(PortfolioConfig {
        sleeves: build_sleeves(adapter)?,
        rules: build_rule_book(adapter)?,
        screen: build_screen_config(adapter)?,
        policy: SelectionPolicy::new(composites),
    })
}

/// Builds the portfolio and writes both CSV artifacts into `output_dir`.
pub fn run_build_pipeline(
    provider: &dyn MetricsPort,
    config: &PortfolioConfig,
    output_dir: &Path,
    stamp: &str,
) -> Result<(BuildOutcome, CsvReportAdapter), SleeveError> {
    check_weight_total(&config.sleeves);

    let outcome = portfolio::build(provider, config)?;

    fs::create_dir_all(output_dir)?;
    let report = CsvReportAdapter::in_dir(output_dir, stamp);
    report.write_all(&outcome.picks, &outcome.universe)?;
    info!(
        picks = %report.picks_path().display(),
        universe = %report.universe_path().display(),
        "artifacts written"
    );

    Ok((outcome, report))
}

fn run_build(config_path: &Path, metrics_path: &Path, output_dir: &Path) -> ExitCode {
    let config = match load_portfolio_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    info!(path = %metrics_path.display(), "loading metrics");
    let provider = match CsvMetricsAdapter::from_path(metrics_path) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    if provider.is_empty() {
        warn!(path = %metrics_path.display(), "metrics file has no rows; every ticker will score as absent");
    }

    let stamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
    let (outcome, report) = match run_build_pipeline(&provider, &config, output_dir, &stamp) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print_summary(&outcome, &config);
    println!("\nPicks written to:    {}", report.picks_path().display());
    println!("Universe written to: {}", report.universe_path().display());
    ExitCode::SUCCESS
}

pub fn print_summary(outcome: &BuildOutcome, config: &PortfolioConfig) {
    println!("=== Selected Portfolio ===");
    let mut ids: Vec<&str> = config.sleeves.iter().map(|s| s.id.as_str()).collect();
    ids.sort();

    for id in ids {
        let sleeve_weight: f64 = outcome.picks_for(id).map(|p| p.target_weight).sum();
        println!("\n{} ({:.1}%)", id, sleeve_weight * 100.0);
        for pick in outcome.picks_for(id) {
            let notes = why_picked(pick);
            println!(
                "  {:<8} {:>6.2}%  score {:>7.3}{}",
                pick.ticker(),
                pick.target_weight * 100.0,
                pick.candidate.score,
                if notes.is_empty() {
                    String::new()
                } else {
                    format!("  ({})", notes.join(", "))
                }
            );
        }
    }

    println!("\nTotal weight: {:.4}", outcome.total_weight());

    if !outcome.fetch_failures.is_empty() {
        println!("\n=== Fetch Failures ===");
        for f in &outcome.fetch_failures {
            println!("  {}: {}", f.ticker, f.reason);
        }
    }
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    let config = match load_portfolio_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    println!("Config validated successfully");

    println!("\nScreen:");
    println!("  pe range: {} to {}", config.screen.pe_min, config.screen.pe_max);
    println!(
        "  require positive profit margin: {}",
        config.screen.require_positive_profit_margin
    );
    println!("  allow missing fields: {}", config.screen.allow_missing_fields);

    println!("\nSleeves:");
    for sleeve in &config.sleeves {
        let (composites, singles) = config.policy.member_counts(&sleeve.tickers);
        let (composite, single) = pool_targets(sleeve.pick_count, composites, singles);
        println!(
            "  {}: weight {:.2}, {} tickers, {} picks ({} composite / {} single-issuer)",
            sleeve.id,
            sleeve.target_weight,
            sleeve.tickers.len(),
            sleeve.pick_count,
            composite,
            single
        );
    }

    let total = check_weight_total(&config.sleeves);
    println!("\nTotal sleeve weight: {:.4}", total);
    println!("Distinct tickers: {}", distinct_tickers(&config.sleeves).len());
    println!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_portfolio_config(&adapter) {
        return fail(e);
    }

    let ids = sleeve_ids(&adapter);
    println!("Sleeves: {}", ids.join(", "));
    println!("\nPortfolio configuration is valid.");
    ExitCode::SUCCESS
}

/// Ensures the sleeve is configured and lists the ticker among its members.
pub fn check_explain_target(
    config: &PortfolioConfig,
    sleeve: &str,
    ticker: &str,
) -> Result<(), SleeveError> {
    let sleeve_id = sleeve.to_lowercase();
    let Some(def) = config.sleeves.iter().find(|s| s.id == sleeve_id) else {
        return Err(SleeveError::ConfigInvalid {
            section: PORTFOLIO_SECTION.into(),
            key: "sleeves".into(),
            reason: format!("sleeve {} is not configured", sleeve_id),
        });
    };
    let ticker = ticker.trim().to_uppercase();
    if !def.tickers.contains(&ticker) {
        return Err(SleeveError::ConfigInvalid {
            section: sleeve_section(&sleeve_id),
            key: "tickers".into(),
            reason: format!("{} is not a member of sleeve {}", ticker, sleeve_id),
        });
    }
    Ok(())
}

fn run_explain(config_path: &Path, metrics_path: &Path, sleeve: &str, ticker: &str) -> ExitCode {
    let config = match load_portfolio_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = check_explain_target(&config, sleeve, ticker) {
        return fail(e);
    }
    let sleeve_id = sleeve.to_lowercase();

    let provider = match CsvMetricsAdapter::from_path(metrics_path) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let metrics = match provider.fetch(ticker) {
        Ok(m) => m.sanitized(),
        Err(e) => return fail(e),
    };

    let rules = config.rules.rules_for(&sleeve_id);
    let result = screen(&metrics, &rules, &config.screen);
    let breakdown = score_breakdown(&metrics, &rules);

    println!("{} under sleeve {}", metrics.ticker, sleeve_id);
    println!("  kind:      {:?}", config.policy.kind_of(&metrics.ticker));
    match metrics.pe_used() {
        Some(pe) => println!("  pe used:   {:.2}", pe),
        None => println!("  pe used:   n/a"),
    }
    if result.passed {
        println!("  screen:    pass");
    } else {
        println!("  screen:    fail ({})", result.joined_reasons());
    }
    println!("\nScore breakdown:");
    println!("  value:     {:>8.4}", breakdown.value);
    println!("  momentum:  {:>8.4}", breakdown.momentum);
    println!("  quality:   {:>8.4}", breakdown.quality);
    println!("  risk:      {:>8.4}", breakdown.risk);
    println!("  total:     {:>8.4}", breakdown.total());

    if metrics.is_all_absent() {
        warn!(ticker = %metrics.ticker, "no metric fields present for ticker");
    }
    ExitCode::SUCCESS
}
