use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::CoreError;
use crate::ingest::parse::{parse_date, parse_decimal};
use crate::models::market_data::MarketData;
use crate::models::price::{ExchangeRateSeries, PriceSeries};
use crate::models::settings::TableLayout;
use crate::models::transaction::{OperationKind, Transaction};

const TRANSACTIONS_TABLE: &str = "transactions";
const PRICES_TABLE: &str = "prices";

/// Reads the transaction ledger and the wide price table from CSV.
///
/// Malformed cells never fail a load: the affected row (or price cell) is
/// skipped and counted in a warning. Structural problems do fail it: a
/// missing header or a missing required column.
pub struct TableLoader<'a> {
    layout: &'a TableLayout,
}

impl<'a> TableLoader<'a> {
    pub fn new(layout: &'a TableLayout) -> Self {
        Self { layout }
    }

    /// Load both tables from paths on disk.
    pub fn load_from_files(
        &self,
        transactions_path: impl AsRef<Path>,
        prices_path: impl AsRef<Path>,
    ) -> Result<MarketData, CoreError> {
        let transactions = File::open(transactions_path.as_ref()).map_err(|e| {
            CoreError::FileIO(format!("{}: {e}", transactions_path.as_ref().display()))
        })?;
        let prices = File::open(prices_path.as_ref())
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", prices_path.as_ref().display())))?;
        self.load_from_readers(transactions, prices)
    }

    pub fn load_from_readers<T: Read, P: Read>(
        &self,
        transactions: T,
        prices: P,
    ) -> Result<MarketData, CoreError> {
        let transactions = self.load_transactions(transactions)?;
        let (prices, exchange_rates) = self.load_prices(prices)?;
        log::info!(
            "loaded {} transactions, {} price points for {} assets, {} exchange rates",
            transactions.len(),
            prices.total_entries(),
            prices.asset_count(),
            exchange_rates.len()
        );
        Ok(MarketData::new(transactions, prices, exchange_rates))
    }

    /// Parse the ledger. Rows whose operation is neither a buy, a sell nor
    /// income are not part of the position history and are left out.
    pub fn load_transactions<R: Read>(&self, reader: R) -> Result<Vec<Transaction>, CoreError> {
        let mut records = self
            .read_records(reader)?
            .into_iter()
            .skip(self.layout.transactions_skip_rows);
        let header = records
            .next()
            .ok_or_else(|| CoreError::EmptyTable(TRANSACTIONS_TABLE.to_string()))?;

        let layout = self.layout;
        let date = required_column(&header, &layout.date_column, TRANSACTIONS_TABLE)?;
        let kind = required_column(&header, &layout.kind_column, TRANSACTIONS_TABLE)?;
        let asset = required_column(&header, &layout.asset_column, TRANSACTIONS_TABLE)?;
        let quantity = required_column(&header, &layout.quantity_column, TRANSACTIONS_TABLE)?;
        let price = required_column(&header, &layout.price_column, TRANSACTIONS_TABLE)?;
        let amount = required_column(&header, &layout.amount_column, TRANSACTIONS_TABLE)?;
        let currency = find_column(&header, &layout.currency_column);

        let mut transactions = Vec::new();
        let mut ignored = 0usize;
        let mut malformed = 0usize;

        for record in records {
            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

            if OperationKind::classify(cell(kind)) == OperationKind::Other {
                ignored += 1;
                continue;
            }

            let (Some(tx_date), Some(tx_amount)) = (
                parse_date(cell(date), &layout.date_format),
                parse_decimal(cell(amount)),
            ) else {
                malformed += 1;
                continue;
            };
            if cell(asset).is_empty() {
                malformed += 1;
                continue;
            }

            let tx_quantity = parse_decimal(cell(quantity));
            let mut tx = Transaction::new(
                tx_date,
                cell(kind),
                cell(asset),
                tx_quantity.unwrap_or_default(),
                parse_decimal(cell(price)).unwrap_or_default(),
                tx_amount,
            )
            .with_seq(transactions.len());
            if tx_quantity.is_none() {
                tx = tx.without_quantity();
            }
            if let Some(idx) = currency {
                if !cell(idx).is_empty() {
                    tx = tx.with_currency(cell(idx));
                }
            }
            transactions.push(tx);
        }

        if ignored > 0 {
            log::debug!("skipped {ignored} ledger rows that are not buys, sells or income");
        }
        if malformed > 0 {
            log::warn!("dropped {malformed} ledger rows with a bad date, amount or asset");
        }
        Ok(transactions)
    }

    /// Parse the wide price table into per-asset series plus the exchange
    /// rate series.
    ///
    /// The first column holds the date. The exchange-rate column is the one
    /// named in the layout, or the last column when none is configured.
    pub fn load_prices<R: Read>(
        &self,
        reader: R,
    ) -> Result<(PriceSeries, ExchangeRateSeries), CoreError> {
        let mut records = self.read_records(reader)?.into_iter();
        let header = records
            .next()
            .ok_or_else(|| CoreError::EmptyTable(PRICES_TABLE.to_string()))?;
        if header.len() < 2 {
            return Err(CoreError::EmptyTable(format!(
                "{PRICES_TABLE}: expected a date column followed by at least one value column"
            )));
        }

        let fx_column = match &self.layout.exchange_rate_column {
            Some(name) => required_column(&header, name, PRICES_TABLE)?,
            None => header.len() - 1,
        };
        let assets: Vec<(usize, String)> = header_names(&header)
            .enumerate()
            .skip(1)
            .filter(|(idx, name)| *idx != fx_column && !name.is_empty())
            .collect();

        let mut prices = PriceSeries::new();
        let mut rates = ExchangeRateSeries::new();
        let mut undated = 0usize;
        let mut unreadable = 0usize;

        for record in records {
            let Some(date) = record
                .get(0)
                .and_then(|cell| parse_date(cell, &self.layout.date_format))
            else {
                undated += 1;
                continue;
            };

            match numeric_cell(&record, fx_column) {
                Cell::Value(rate) => rates.set_rate(date, rate),
                Cell::Invalid => unreadable += 1,
                Cell::Empty => {}
            }
            for (idx, asset) in &assets {
                match numeric_cell(&record, *idx) {
                    Cell::Value(price) => prices.set_price(asset, date, price),
                    Cell::Invalid => unreadable += 1,
                    Cell::Empty => {}
                }
            }
        }

        if undated > 0 {
            log::warn!("dropped {undated} price rows with an unparseable date");
        }
        if unreadable > 0 {
            log::warn!("dropped {unreadable} price or rate cells that are not numbers");
        }
        if rates.is_empty() {
            log::warn!("price table has no exchange rates; local-currency values stay unconverted");
        }
        Ok((prices, rates))
    }

    fn read_records<R: Read>(&self, reader: R) -> Result<Vec<StringRecord>, CoreError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.layout.delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

enum Cell {
    Empty,
    Invalid,
    Value(Decimal),
}

fn numeric_cell(record: &StringRecord, idx: usize) -> Cell {
    let raw = record.get(idx).unwrap_or("").trim();
    if raw.is_empty() {
        return Cell::Empty;
    }
    parse_decimal(raw).map_or(Cell::Invalid, Cell::Value)
}

fn header_names(header: &StringRecord) -> impl Iterator<Item = String> + '_ {
    header
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
}

fn find_column(header: &StringRecord, name: &str) -> Option<usize> {
    let wanted = name.trim();
    header_names(header).position(|candidate| candidate == wanted)
}

fn required_column(header: &StringRecord, name: &str, table: &str) -> Result<usize, CoreError> {
    find_column(header, name).ok_or_else(|| CoreError::MissingColumn {
        table: table.to_string(),
        column: name.to_string(),
    })
}
