use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::transaction::{sort_chronologically, Transaction};

/// Outcome of walking one asset's history up to a scan bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetScan {
    /// Date of the last positive → zero-or-below crossing, if any
    pub last_reset_date: Option<NaiveDate>,

    /// Running quantity after the last scanned row (pinned to 0 at each reset)
    pub running_quantity: Decimal,
}

/// Reconstructs an asset's holding over time and finds where it last closed out.
///
/// Pure business logic: every function takes one asset's transactions,
/// already netted, normalized and sorted chronologically.
pub struct PositionService;

impl PositionService {
    pub fn new() -> Self {
        Self
    }

    /// Split transactions per asset, each group sorted by (date, input position).
    /// Asset order is deterministic (sorted by id).
    pub fn group_by_asset(&self, transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
        let mut groups: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
        for tx in transactions {
            groups.entry(tx.asset.clone()).or_default().push(tx.clone());
        }
        for ops in groups.values_mut() {
            sort_chronologically(ops);
        }
        groups
    }

    /// Walk every row dated on or before `bound`, tracking the running
    /// quantity and the last reset.
    ///
    /// A reset happens when the quantity goes from strictly positive to zero
    /// or below; the running quantity is then pinned back to 0.
    pub fn scan(&self, ops: &[Transaction], bound: NaiveDate) -> ResetScan {
        let mut running = Decimal::ZERO;
        let mut last_reset_date = None;

        for tx in ops.iter().take_while(|tx| tx.date <= bound) {
            let (next, reset) = step(running, tx);
            running = next;
            if reset {
                last_reset_date = Some(tx.date);
            }
        }

        ResetScan {
            last_reset_date,
            running_quantity: running,
        }
    }

    /// Date of the last reset on or before `bound`.
    pub fn last_reset(&self, ops: &[Transaction], bound: NaiveDate) -> Option<NaiveDate> {
        self.scan(ops, bound).last_reset_date
    }

    /// Rows that make up the open position: strictly after the reset (all of
    /// them when there was none) and no later than `upper`.
    pub fn retained<'a>(
        &self,
        ops: &'a [Transaction],
        last_reset: Option<NaiveDate>,
        upper: NaiveDate,
    ) -> Vec<&'a Transaction> {
        ops.iter()
            .filter(|tx| tx.date <= upper)
            .filter(|tx| last_reset.map_or(true, |reset| tx.date > reset))
            .collect()
    }

    /// Running quantity (with reset pinning) over rows dated strictly before `date`.
    pub fn quantity_before(&self, ops: &[Transaction], date: NaiveDate) -> Decimal {
        ops.iter()
            .take_while(|tx| tx.date < date)
            .fold(Decimal::ZERO, |running, tx| step(running, tx).0)
    }

    /// Whether the asset was open at some point in `[start, end]`: either the
    /// running quantity is positive right after a row inside the window, or a
    /// positive quantity was carried into it.
    pub fn was_open_during(&self, ops: &[Transaction], start: NaiveDate, end: NaiveDate) -> bool {
        let mut running = Decimal::ZERO;
        for tx in ops.iter().take_while(|tx| tx.date <= end) {
            running = step(running, tx).0;
            if tx.date >= start && running > Decimal::ZERO {
                return true;
            }
        }
        self.quantity_before(ops, start) > Decimal::ZERO
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one row to the running quantity. Returns the new quantity and
/// whether this row closed the position.
fn step(previous: Decimal, tx: &Transaction) -> (Decimal, bool) {
    let next = previous + tx.quantity_delta();
    if previous > Decimal::ZERO && next <= Decimal::ZERO {
        (Decimal::ZERO, true)
    } else {
        (next, false)
    }
}
