use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregates of one asset's retained (post-reset) operations up to a date.
///
/// Produced fresh per query; never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub quantity_open: Decimal,

    /// Sum of buy amounts
    pub capital_invested: Decimal,

    /// Sum of sell amounts
    pub proceeds_from_sales: Decimal,

    /// Sum of dividend / coupon / amortization amounts
    pub income_received: Decimal,

    /// Price used to value the open quantity (zero until resolved)
    pub valuation_price: Decimal,

    pub market_value: Decimal,

    /// (market_value - capital_invested) + income_received + proceeds_from_sales
    pub total_gain: Decimal,
}

// ── Current composition ─────────────────────────────────────────────

/// One open position in the current-composition report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRow {
    pub asset: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub market_value: Decimal,
    pub capital_invested: Decimal,
    pub proceeds: Decimal,
    pub income: Decimal,
    pub total_gain: Decimal,
}

/// Portfolio-wide totals of a composition report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionSummary {
    pub asset_count: usize,
    pub total_market_value: Decimal,
    pub total_invested: Decimal,

    /// Cash already extracted: proceeds + income
    pub net_flows: Decimal,

    pub total_gain: Decimal,

    /// total_gain / total_invested * 100, or 0 when nothing was invested
    pub gain_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionReport {
    pub as_of: NaiveDate,

    /// Open positions, sorted by asset id
    pub rows: Vec<CompositionRow>,

    pub summary: CompositionSummary,

    /// Open positions left out because no price could be resolved
    pub unpriced_assets: Vec<String>,
}

// ── Evolution ───────────────────────────────────────────────────────

/// One asset active during an evolution window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRow {
    pub asset: String,
    pub quantity_end: Decimal,
    pub price_end: Decimal,
    pub market_value_end: Decimal,

    /// Value carried into the window plus buys made inside it
    pub value_at_start: Decimal,

    pub proceeds_in_period: Decimal,
    pub income_in_period: Decimal,
    pub total_gain: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSummary {
    pub asset_count: usize,
    pub total_value_end: Decimal,
    pub total_value_start: Decimal,
    pub net_flows: Decimal,
    pub total_gain: Decimal,

    /// total_gain / total_value_start * 100, or 0 when the start value is not positive
    pub gain_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: Vec<EvolutionRow>,
    pub summary: EvolutionSummary,

    /// Assets whose start or end price could not be resolved (valued at 0)
    pub unpriced_assets: Vec<String>,
}

// ── Per-asset detail ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub date: NaiveDate,
    pub operation_label: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub value: Decimal,
}

/// Operations that shaped one asset's position over a window, preceded by
/// an opening-value row when a position was carried into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailReport {
    pub asset: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: Vec<DetailRow>,
}

/// Percentage of `part` over `base`, or zero when `base` is not positive.
pub(crate) fn percentage(part: Decimal, base: Decimal) -> Decimal {
    if base > Decimal::ZERO {
        part / base * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}
