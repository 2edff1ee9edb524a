//! Command-line arguments for `portfolio-analyzer`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Reconstructs open positions from a brokerage ledger and values them
/// against a daily price table.
#[derive(Debug, Parser)]
#[command(name = "portfolio-analyzer", version, about)]
pub struct Cli {
    /// Transaction ledger (CSV).
    #[arg(long, short = 't', global = true, default_value = "operaciones.csv")]
    pub transactions: PathBuf,

    /// Wide price table (CSV): date column, one column per asset, FX rate last.
    #[arg(long, short = 'p', global = true, default_value = "precios.csv")]
    pub prices: PathBuf,

    /// JSON settings file. Fields left out keep their defaults.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for the terminal.
    Table,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open positions and their value on a date.
    Composition(CompositionArgs),

    /// Per-asset performance between two dates.
    Evolution(RangeArgs),

    /// Opening value and operations of one asset between two dates.
    Detail(DetailArgs),

    /// Price of one asset on a date, with placeholder fallback.
    Price(PriceArgs),

    /// List every asset found in the ledger.
    Assets,
}

#[derive(Debug, Args)]
pub struct CompositionArgs {
    /// Valuation date. Defaults to today.
    #[arg(long, short = 'd')]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    #[arg(long, short = 's')]
    pub start: String,

    #[arg(long, short = 'e')]
    pub end: String,
}

#[derive(Debug, Args)]
pub struct DetailArgs {
    pub asset: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    pub asset: String,

    /// Defaults to today.
    #[arg(long, short = 'd')]
    pub date: Option<String>,
}
