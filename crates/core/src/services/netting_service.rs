use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::currency::{CurrencyClassifier, CurrencyKind};
use crate::models::transaction::{OperationKind, Transaction};

/// Cancels buys against opposite-currency sells of the same asset that
/// settle within a few days of each other.
///
/// A dollar buy paired with a peso sell a couple of days apart is one
/// currency round-trip, not two trades. Matched quantity is removed from
/// both rows before positions are reconstructed.
pub struct NettingService {
    classifier: CurrencyClassifier,
    window_days: i64,
}

impl NettingService {
    pub fn new(classifier: CurrencyClassifier, window_days: i64) -> Self {
        Self {
            classifier,
            window_days,
        }
    }

    /// Return a netted copy of `transactions`.
    ///
    /// Input order is preserved. Rows whose quantity ends at exactly zero
    /// are dropped; rows with a blank quantity cell (income, usually) stay.
    pub fn net(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = transactions.to_vec();
        let kinds: Vec<CurrencyKind> = rows
            .iter()
            .map(|tx| self.classifier.classify(tx.currency_label.as_deref()))
            .collect();

        let groups: Vec<Vec<usize>> = group_indices_by_asset(&rows).into_values().collect();
        for indices in &groups {
            self.net_asset(&mut rows, &kinds, indices);
        }

        rows.retain(|tx| !tx.is_zero_quantity());
        rows
    }

    /// Net one asset. `indices` point into `rows` and are already in
    /// chronological order.
    fn net_asset(&self, rows: &mut [Transaction], kinds: &[CurrencyKind], indices: &[usize]) {
        let (buys, sells): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .filter(|&i| matches!(rows[i].operation(), OperationKind::Buy | OperationKind::Sell))
            .partition(|&i| rows[i].operation() == OperationKind::Buy);

        for &buy in &buys {
            if rows[buy].quantity <= Decimal::ZERO {
                continue;
            }

            let buy_date = rows[buy].date;
            let eligible: Vec<usize> = sells
                .iter()
                .copied()
                .filter(|&sell| {
                    rows[sell].quantity < Decimal::ZERO
                        && kinds[sell] != kinds[buy]
                        && (rows[sell].date - buy_date).num_days().abs() <= self.window_days
                })
                .collect();

            for sell in eligible {
                if rows[buy].quantity <= Decimal::ZERO {
                    break;
                }
                self.match_pair(rows, buy, sell);
            }
        }
    }

    /// Cancel as much of `buy` against `sell` as both rows allow.
    fn match_pair(&self, rows: &mut [Transaction], buy: usize, sell: usize) {
        let buy_remaining = rows[buy].quantity;
        let sell_remaining = rows[sell].quantity.abs();

        if sell_remaining >= buy_remaining {
            let ratio = buy_remaining / sell_remaining;
            rows[buy].quantity = Decimal::ZERO;
            rows[buy].amount = Decimal::ZERO;
            // the sell keeps its negative sign
            rows[sell].quantity = -(sell_remaining - buy_remaining);
            rows[sell].amount *= Decimal::ONE - ratio;
        } else {
            let ratio = sell_remaining / buy_remaining;
            rows[buy].quantity = buy_remaining - sell_remaining;
            rows[buy].amount *= Decimal::ONE - ratio;
            rows[sell].quantity = Decimal::ZERO;
            rows[sell].amount = Decimal::ZERO;
        }

        log::debug!(
            "netted {} of {}: buy on {} against sell on {}",
            buy_remaining.min(sell_remaining),
            rows[buy].asset,
            rows[buy].date,
            rows[sell].date
        );
    }
}

impl Default for NettingService {
    fn default() -> Self {
        Self::new(CurrencyClassifier::default(), 7)
    }
}

/// asset → row indices sorted by (date, input position)
fn group_indices_by_asset(rows: &[Transaction]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, tx) in rows.iter().enumerate() {
        groups.entry(tx.asset.as_str()).or_default().push(idx);
    }
    for indices in groups.values_mut() {
        indices.sort_by(|&a, &b| rows[a].date.cmp(&rows[b].date).then(rows[a].seq.cmp(&rows[b].seq)));
    }
    groups
}
