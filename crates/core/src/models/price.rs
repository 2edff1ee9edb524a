use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single price data point (date → price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Sparse per-asset price history.
///
/// Points are kept sorted by date per asset, so every lookup is a binary
/// search. Lookups resolve to the latest point at or before the requested
/// date: never interpolated, never looking forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// asset id → sorted Vec of PricePoints
    pub entries: HashMap<String, Vec<PricePoint>>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a price point.
    /// Maintains sorted order by date using binary search.
    pub fn set_price(&mut self, asset: &str, date: NaiveDate, price: Decimal) {
        let entries = self.entries.entry(asset.trim().to_string()).or_default();
        upsert(entries, date, price);
    }

    /// Latest price for `asset` at or before `date`.
    pub fn price_at_or_before(&self, asset: &str, date: NaiveDate) -> Option<Decimal> {
        let entries = self.entries.get(asset)?;
        latest_at_or_before(entries, date)
    }

    /// Whether the asset has any price point at all.
    pub fn has_asset(&self, asset: &str) -> bool {
        self.entries.get(asset).is_some_and(|v| !v.is_empty())
    }

    /// Get the total number of price points across all assets.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    pub fn asset_count(&self) -> usize {
        self.entries.len()
    }
}

/// Date-indexed exchange rate, expressed as local units per foreign unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSeries {
    pub points: Vec<PricePoint>,
}

impl ExchangeRateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rate(&mut self, date: NaiveDate, rate: Decimal) {
        upsert(&mut self.points, date, rate);
    }

    /// Latest rate at or before `date`.
    pub fn rate_at_or_before(&self, date: NaiveDate) -> Option<Decimal> {
        latest_at_or_before(&self.points, date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(NaiveDate, Decimal)> for ExchangeRateSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (date, rate) in iter {
            series.set_rate(date, rate);
        }
        series
    }
}

fn upsert(entries: &mut Vec<PricePoint>, date: NaiveDate, price: Decimal) {
    match entries.binary_search_by_key(&date, |p| p.date) {
        Ok(idx) => entries[idx].price = price,
        Err(idx) => entries.insert(idx, PricePoint { date, price }),
    }
}

fn latest_at_or_before(entries: &[PricePoint], date: NaiveDate) -> Option<Decimal> {
    // Index of the first entry strictly after `date`.
    let after = entries.partition_point(|p| p.date <= date);
    after.checked_sub(1).map(|idx| entries[idx].price)
}
