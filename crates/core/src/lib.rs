pub mod errors;
pub mod ingest;
pub mod models;
pub mod services;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use errors::CoreError;
use ingest::loader::TableLoader;
use models::{
    currency::CurrencyClassifier,
    market_data::MarketData,
    report::{CompositionReport, DetailReport, EvolutionReport},
    settings::Settings,
    transaction::Transaction,
};
use services::{
    netting_service::NettingService, normalizer_service::NormalizerService,
    price_service::PriceService, valuation_service::{ValuationInputs, ValuationService},
};

/// Main entry point for the portfolio analyzer core library.
///
/// Holds the loaded input tables and the configured services. Every query
/// re-derives the prepared ledger (normalized, then netted) from the
/// untouched input, so queries never influence one another.
#[must_use]
pub struct PortfolioAnalyzer {
    market_data: MarketData,
    settings: Settings,
    normalizer: NormalizerService,
    netting: NettingService,
    valuation: ValuationService,
    price_service: PriceService,
}

impl std::fmt::Debug for PortfolioAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioAnalyzer")
            .field("transactions", &self.market_data.transactions.len())
            .field("price_points", &self.market_data.prices.total_entries())
            .field("exchange_rates", &self.market_data.exchange_rates.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl PortfolioAnalyzer {
    /// Build an analyzer over already-loaded tables.
    pub fn new(market_data: MarketData, settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let classifier = CurrencyClassifier::from_settings(&settings);
        Ok(Self {
            normalizer: NormalizerService::new(classifier.clone()),
            netting: NettingService::new(classifier, settings.netting_window_days),
            valuation: ValuationService::new(PriceService::from_settings(&settings)),
            price_service: PriceService::from_settings(&settings),
            market_data,
            settings,
        })
    }

    /// Load the ledger and the price table from CSV files on disk.
    pub fn from_csv_files(
        transactions_path: impl AsRef<Path>,
        prices_path: impl AsRef<Path>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let market_data =
            TableLoader::new(&settings.layout).load_from_files(transactions_path, prices_path)?;
        Self::new(market_data, settings)
    }

    /// Load the ledger and the price table from any CSV readers.
    pub fn from_readers<T: Read, P: Read>(
        transactions: T,
        prices: P,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let market_data = TableLoader::new(&settings.layout).load_from_readers(transactions, prices)?;
        Self::new(market_data, settings)
    }

    // ── Pipeline ────────────────────────────────────────────────────

    /// Normalized and netted copy of the ledger, in input order.
    /// Recomputed on every call.
    pub fn prepared_transactions(&self) -> Vec<Transaction> {
        let normalized = self
            .normalizer
            .normalize(&self.market_data.transactions, &self.market_data.exchange_rates);
        self.netting.net(&normalized)
    }

    // ── Reports ─────────────────────────────────────────────────────

    /// Open positions and their value as of `as_of`.
    pub fn current_composition(&self, as_of: NaiveDate) -> CompositionReport {
        let prepared = self.prepared_transactions();
        self.valuation.composition(self.inputs(&prepared), as_of)
    }

    /// Performance of every asset active between `start` and `end` (inclusive).
    pub fn evolution(&self, start: NaiveDate, end: NaiveDate) -> Result<EvolutionReport, CoreError> {
        validate_range(start, end)?;
        let prepared = self.prepared_transactions();
        Ok(self.valuation.evolution(self.inputs(&prepared), start, end))
    }

    /// Opening value and in-window operations of one asset.
    pub fn asset_detail(
        &self,
        asset: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DetailReport, CoreError> {
        validate_range(start, end)?;
        let prepared = self.prepared_transactions();
        Ok(self.valuation.detail(
            self.inputs(&prepared),
            asset.trim(),
            start,
            end,
            &self.settings.opening_value_label,
        ))
    }

    // ── Lookups ─────────────────────────────────────────────────────

    /// Price of `asset` on `date` (own series, then placeholder). `None` when unvalued.
    #[must_use]
    pub fn resolve_price(&self, asset: &str, date: NaiveDate) -> Option<Decimal> {
        let prepared = self.prepared_transactions();
        self.price_service.resolve(
            asset.trim(),
            date,
            &self.market_data.prices,
            &prepared,
            &self.market_data.exchange_rates,
        )
    }

    /// Distinct asset ids in the ledger, sorted.
    #[must_use]
    pub fn assets(&self) -> Vec<String> {
        self.market_data
            .transactions
            .iter()
            .map(|tx| tx.asset.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Parse a query date using the configured layout format, falling back to ISO.
    pub fn parse_date(&self, value: &str) -> Result<NaiveDate, CoreError> {
        ingest::parse::parse_date(value, &self.settings.layout.date_format)
            .ok_or_else(|| CoreError::InvalidDate(value.to_string()))
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn market_data(&self) -> &MarketData {
        &self.market_data
    }

    // ── JSON export ─────────────────────────────────────────────────

    pub fn composition_to_json(report: &CompositionReport) -> Result<String, CoreError> {
        to_json(report)
    }

    pub fn evolution_to_json(report: &EvolutionReport) -> Result<String, CoreError> {
        to_json(report)
    }

    pub fn detail_to_json(report: &DetailReport) -> Result<String, CoreError> {
        to_json(report)
    }

    fn inputs<'a>(&'a self, prepared: &'a [Transaction]) -> ValuationInputs<'a> {
        ValuationInputs {
            transactions: prepared,
            prices: &self.market_data.prices,
            exchange_rates: &self.market_data.exchange_rates,
        }
    }
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::ValidationError(format!(
            "start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CoreError> {
    serde_json::to_string_pretty(value).map_err(|e| CoreError::Serialization(e.to_string()))
}
