use serde::{Deserialize, Serialize};

use super::price::{ExchangeRateSeries, PriceSeries};
use super::transaction::Transaction;

/// The three input tables every query runs against.
///
/// Loaded once and never mutated afterwards: normalization and netting work
/// on fresh copies per query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Ledger rows in input order
    pub transactions: Vec<Transaction>,

    /// Per-asset price history (long form)
    pub prices: PriceSeries,

    /// Local-per-foreign exchange rate history
    pub exchange_rates: ExchangeRateSeries,
}

impl MarketData {
    /// Assemble market data, stamping each transaction with its input position.
    pub fn new(
        transactions: Vec<Transaction>,
        prices: PriceSeries,
        exchange_rates: ExchangeRateSeries,
    ) -> Self {
        let transactions = transactions
            .into_iter()
            .enumerate()
            .map(|(seq, tx)| tx.with_seq(seq))
            .collect();
        Self {
            transactions,
            prices,
            exchange_rates,
        }
    }
}
