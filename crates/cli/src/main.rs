mod cli;
mod error;
mod output;

use chrono::NaiveDate;
use clap::Parser;
use portfolio_analyzer_core::models::settings::Settings;
use portfolio_analyzer_core::PortfolioAnalyzer;
use std::io::Write;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

fn main() {
    init_tracing();
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

/// Logs go to stderr so reports on stdout stay pipeable. `RUST_LOG` overrides
/// the default `info` level; the core's `log` records are picked up too.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    tracing::debug!(?settings, "settings loaded");

    let analyzer = PortfolioAnalyzer::from_csv_files(&cli.transactions, &cli.prices, settings)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Composition(args) => {
            let as_of = date_or_today(&analyzer, args.date.as_deref())?;
            let report = analyzer.current_composition(as_of);
            match cli.format {
                OutputFormat::Json => {
                    writeln!(out, "{}", PortfolioAnalyzer::composition_to_json(&report)?)?
                }
                OutputFormat::Table => output::composition(&mut out, &report)?,
            }
        }
        Command::Evolution(range) => {
            let start = analyzer.parse_date(&range.start)?;
            let end = analyzer.parse_date(&range.end)?;
            let report = analyzer.evolution(start, end)?;
            match cli.format {
                OutputFormat::Json => {
                    writeln!(out, "{}", PortfolioAnalyzer::evolution_to_json(&report)?)?
                }
                OutputFormat::Table => output::evolution(&mut out, &report)?,
            }
        }
        Command::Detail(args) => {
            let start = analyzer.parse_date(&args.range.start)?;
            let end = analyzer.parse_date(&args.range.end)?;
            let report = analyzer.asset_detail(&args.asset, start, end)?;
            match cli.format {
                OutputFormat::Json => {
                    writeln!(out, "{}", PortfolioAnalyzer::detail_to_json(&report)?)?
                }
                OutputFormat::Table => output::detail(&mut out, &report)?,
            }
        }
        Command::Price(args) => {
            let date = date_or_today(&analyzer, args.date.as_deref())?;
            match analyzer.resolve_price(&args.asset, date) {
                Some(price) => writeln!(out, "{} {} {}", args.asset, date, price)?,
                None => {
                    tracing::warn!(asset = %args.asset, %date, "no price available");
                    writeln!(out, "{} {} unvalued", args.asset, date)?;
                }
            }
        }
        Command::Assets => {
            for asset in analyzer.assets() {
                writeln!(out, "{asset}")?;
            }
        }
    }

    Ok(())
}

fn date_or_today(analyzer: &PortfolioAnalyzer, value: Option<&str>) -> Result<NaiveDate, CliError> {
    match value {
        Some(value) => Ok(analyzer.parse_date(value)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
