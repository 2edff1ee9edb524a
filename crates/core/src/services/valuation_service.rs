use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::price::{ExchangeRateSeries, PriceSeries};
use crate::models::report::{
    percentage, CompositionReport, CompositionRow, CompositionSummary, DetailReport, DetailRow,
    EvolutionReport, EvolutionRow, EvolutionSummary, PositionSnapshot,
};
use crate::models::transaction::{OperationKind, Transaction};
use crate::services::position_service::PositionService;
use crate::services::price_service::PriceService;

/// Everything a valuation reads: prepared (normalized + netted) transactions
/// and the two price tables.
#[derive(Debug, Clone, Copy)]
pub struct ValuationInputs<'a> {
    pub transactions: &'a [Transaction],
    pub prices: &'a PriceSeries,
    pub exchange_rates: &'a ExchangeRateSeries,
}

/// Values open positions at a date and across a date range.
///
/// The current-composition, evolution and detail reports all run the same
/// steps: find the reset relevant to the window, keep the rows after it,
/// aggregate them, then price the open quantity.
pub struct ValuationService {
    position_service: PositionService,
    price_service: PriceService,
}

impl ValuationService {
    pub fn new(price_service: PriceService) -> Self {
        Self {
            position_service: PositionService::new(),
            price_service,
        }
    }

    /// Aggregate retained rows dated on or before `as_of`. Price fields stay zero.
    pub fn snapshot(&self, retained: &[&Transaction], as_of: NaiveDate) -> PositionSnapshot {
        let mut snapshot = PositionSnapshot::default();
        for tx in retained.iter().filter(|tx| tx.date <= as_of) {
            match tx.operation() {
                OperationKind::Buy => {
                    snapshot.quantity_open += tx.quantity;
                    snapshot.capital_invested += tx.amount;
                }
                OperationKind::Sell => {
                    snapshot.quantity_open -= tx.quantity.abs();
                    snapshot.proceeds_from_sales += tx.amount;
                }
                OperationKind::Income => snapshot.income_received += tx.amount,
                OperationKind::Other => {}
            }
        }
        snapshot
    }

    /// Fill in the price-dependent fields of a snapshot. `None` when the
    /// figures do not fit in a `Decimal`.
    pub fn value_snapshot(
        &self,
        mut snapshot: PositionSnapshot,
        price: Decimal,
    ) -> Option<PositionSnapshot> {
        let market_value = snapshot.quantity_open.checked_mul(price)?;
        let total_gain = market_value
            .checked_sub(snapshot.capital_invested)?
            .checked_add(snapshot.income_received)?
            .checked_add(snapshot.proceeds_from_sales)?;
        snapshot.valuation_price = price;
        snapshot.market_value = market_value;
        snapshot.total_gain = total_gain;
        Some(snapshot)
    }

    /// Open positions as of `as_of`.
    ///
    /// Closed positions (quantity ≤ 0) are left out. So are open positions
    /// with no resolvable price; those are listed in `unpriced_assets`.
    pub fn composition(&self, inputs: ValuationInputs<'_>, as_of: NaiveDate) -> CompositionReport {
        let mut rows = Vec::new();
        let mut unpriced_assets = Vec::new();

        for (asset, ops) in self.position_service.group_by_asset(inputs.transactions) {
            let last_reset = self.position_service.last_reset(&ops, as_of);
            let retained = self.position_service.retained(&ops, last_reset, as_of);
            if retained.is_empty() {
                continue;
            }

            let snapshot = self.snapshot(&retained, as_of);
            if snapshot.quantity_open <= Decimal::ZERO {
                continue;
            }

            let quantity = snapshot.quantity_open;
            let valued = match self.resolve(inputs, &asset, as_of) {
                Some(price) if price > Decimal::ZERO => self.value_snapshot(snapshot, price),
                _ => None,
            };
            let Some(valued) = valued else {
                log::warn!("{asset}: open position of {quantity} has no usable price on {as_of}");
                unpriced_assets.push(asset);
                continue;
            };
            rows.push(CompositionRow {
                asset,
                quantity: valued.quantity_open,
                price: valued.valuation_price,
                market_value: valued.market_value,
                capital_invested: valued.capital_invested,
                proceeds: valued.proceeds_from_sales,
                income: valued.income_received,
                total_gain: valued.total_gain,
            });
        }

        let summary = summarize_composition(&rows);
        log::info!(
            "composition on {as_of}: {} open positions, value {}",
            summary.asset_count,
            summary.total_market_value
        );

        CompositionReport {
            as_of,
            rows,
            summary,
            unpriced_assets,
        }
    }

    /// Performance of every asset active in `[start, end]`.
    ///
    /// The reset is taken as of `start`; cumulative figures are compared at
    /// `start` and at `end`, and buys dated in `(start, end]` count as
    /// capital brought into the window.
    pub fn evolution(
        &self,
        inputs: ValuationInputs<'_>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EvolutionReport {
        let mut rows = Vec::new();
        let mut unpriced_assets = Vec::new();

        for (asset, ops) in self.position_service.group_by_asset(inputs.transactions) {
            if !self.position_service.was_open_during(&ops, start, end) {
                continue;
            }

            let last_reset = self.position_service.last_reset(&ops, start);
            let retained = self.position_service.retained(&ops, last_reset, end);

            let at_start = self.snapshot(&retained, start);
            let at_end = self.snapshot(&retained, end);

            let price_start = self.resolve(inputs, &asset, start);
            let price_end = self.resolve(inputs, &asset, end);
            let carried_in = at_start.quantity_open > Decimal::ZERO;

            let opening_value = if carried_in {
                price_start.and_then(|price| at_start.quantity_open.checked_mul(price))
            } else {
                Some(Decimal::ZERO)
            };
            let closing_value = if at_end.quantity_open.is_zero() {
                Some(Decimal::ZERO)
            } else {
                price_end.and_then(|price| at_end.quantity_open.checked_mul(price))
            };
            if opening_value.is_none() || closing_value.is_none() {
                log::warn!("{asset}: no usable price for {start}..{end}, valued at 0");
                unpriced_assets.push(asset.clone());
            }

            let buys_in_period: Decimal = retained
                .iter()
                .filter(|tx| tx.date > start && tx.operation() == OperationKind::Buy)
                .map(|tx| tx.amount)
                .sum();

            let value_at_start = buys_in_period + opening_value.unwrap_or_default();
            let market_value_end = closing_value.unwrap_or_default();
            let income_in_period = at_end.income_received - at_start.income_received;
            let proceeds_in_period = at_end.proceeds_from_sales - at_start.proceeds_from_sales;

            rows.push(EvolutionRow {
                asset,
                quantity_end: at_end.quantity_open,
                price_end: price_end.unwrap_or_default(),
                market_value_end,
                value_at_start,
                proceeds_in_period,
                income_in_period,
                total_gain: (market_value_end - value_at_start) + income_in_period + proceeds_in_period,
            });
        }

        let summary = summarize_evolution(&rows);
        log::info!(
            "evolution {start}..{end}: {} active assets, gain {}",
            summary.asset_count,
            summary.total_gain
        );

        EvolutionReport {
            start,
            end,
            rows,
            summary,
            unpriced_assets,
        }
    }

    /// Operations behind one asset's evolution row.
    ///
    /// Starts with an opening-value row when a position was carried into the
    /// window, followed by every retained row dated in `(start, end]`.
    pub fn detail(
        &self,
        inputs: ValuationInputs<'_>,
        asset: &str,
        start: NaiveDate,
        end: NaiveDate,
        opening_label: &str,
    ) -> DetailReport {
        let ops: Vec<Transaction> = self
            .position_service
            .group_by_asset(inputs.transactions)
            .remove(asset)
            .unwrap_or_default();

        let last_reset = self.position_service.last_reset(&ops, start);
        let retained = self.position_service.retained(&ops, last_reset, end);
        let opening = self.snapshot(&retained, start);

        let mut rows = Vec::new();
        if opening.quantity_open > Decimal::ZERO {
            let price = self.resolve(inputs, asset, start);
            let value = price.and_then(|price| opening.quantity_open.checked_mul(price));
            if value.is_none() {
                log::warn!("{asset}: no usable price on {start}, opening value set to 0");
            }
            rows.push(DetailRow {
                date: start,
                operation_label: opening_label.to_string(),
                quantity: opening.quantity_open,
                price: price.unwrap_or_default(),
                value: value.unwrap_or_default(),
            });
        }

        rows.extend(retained.iter().filter(|tx| tx.date > start).map(|tx| DetailRow {
            date: tx.date,
            operation_label: tx.kind.clone(),
            quantity: tx.quantity,
            price: tx.price,
            value: tx.amount,
        }));
        log::info!("detail {asset} {start}..{end}: {} rows", rows.len());

        DetailReport {
            asset: asset.to_string(),
            start,
            end,
            rows,
        }
    }

    fn resolve(&self, inputs: ValuationInputs<'_>, asset: &str, date: NaiveDate) -> Option<Decimal> {
        self.price_service.resolve(
            asset,
            date,
            inputs.prices,
            inputs.transactions,
            inputs.exchange_rates,
        )
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new(PriceService::default())
    }
}

fn summarize_composition(rows: &[CompositionRow]) -> CompositionSummary {
    let mut summary = CompositionSummary {
        asset_count: rows.len(),
        ..CompositionSummary::default()
    };
    for row in rows {
        summary.total_market_value += row.market_value;
        summary.total_invested += row.capital_invested;
        summary.net_flows += row.proceeds + row.income;
        summary.total_gain += row.total_gain;
    }
    summary.gain_pct = percentage(summary.total_gain, summary.total_invested);
    summary
}

fn summarize_evolution(rows: &[EvolutionRow]) -> EvolutionSummary {
    let mut summary = EvolutionSummary {
        asset_count: rows.len(),
        ..EvolutionSummary::default()
    };
    for row in rows {
        summary.total_value_end += row.market_value_end;
        summary.total_value_start += row.value_at_start;
        summary.net_flows += row.proceeds_in_period + row.income_in_period;
        summary.total_gain += row.total_gain;
    }
    summary.gain_pct = percentage(summary.total_gain, summary.total_value_start);
    summary
}
