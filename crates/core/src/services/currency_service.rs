use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::price::ExchangeRateSeries;

/// Converts local-currency values into foreign units.
///
/// Both the price normalizer and the price resolver go through here, so a
/// missing or zero rate is handled the same way everywhere: no conversion.
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Usable rate at or before `date`, i.e. present and nonzero.
    pub fn usable_rate(&self, rates: &ExchangeRateSeries, date: NaiveDate) -> Option<Decimal> {
        rates
            .rate_at_or_before(date)
            .filter(|rate| !rate.is_zero())
    }

    /// Convert a local-currency value to foreign units with the rate in force on `date`.
    /// Returns `None` when no usable rate exists or the quotient overflows;
    /// callers keep the value unconverted.
    pub fn local_to_foreign(
        &self,
        value: Decimal,
        date: NaiveDate,
        rates: &ExchangeRateSeries,
    ) -> Option<Decimal> {
        self.usable_rate(rates, date)
            .and_then(|rate| value.checked_div(rate))
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
