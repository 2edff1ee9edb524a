use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::currency::{CurrencyClassifier, CurrencyKind};
use crate::models::price::{ExchangeRateSeries, PriceSeries};
use crate::models::settings::Settings;
use crate::models::transaction::Transaction;
use crate::services::currency_service::CurrencyService;

/// Resolves the price of an asset on a date, with a placeholder fallback.
///
/// Resolution order:
/// 1. The asset's own latest price at or before the date.
/// 2. A placeholder series chosen by the currency of the asset's most
///    recent ledger row (foreign → foreign placeholder as-is; local or
///    unknown → local placeholder, divided by the FX rate when local).
/// 3. Nothing: `None`, which callers treat as "unvalued", never as a real
///    zero price.
pub struct PriceService {
    classifier: CurrencyClassifier,
    currency_service: CurrencyService,
    foreign_placeholder: String,
    local_placeholder: String,
}

impl PriceService {
    pub fn new(
        classifier: CurrencyClassifier,
        foreign_placeholder: impl Into<String>,
        local_placeholder: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            currency_service: CurrencyService::new(),
            foreign_placeholder: foreign_placeholder.into(),
            local_placeholder: local_placeholder.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            CurrencyClassifier::from_settings(settings),
            settings.foreign_placeholder_asset.clone(),
            settings.local_placeholder_asset.clone(),
        )
    }

    /// Get the price of `asset` on `date`.
    ///
    /// `transactions` is scanned in its given order; the last row for the
    /// asset decides the placeholder currency.
    pub fn resolve(
        &self,
        asset: &str,
        date: NaiveDate,
        prices: &PriceSeries,
        transactions: &[Transaction],
        rates: &ExchangeRateSeries,
    ) -> Option<Decimal> {
        if let Some(price) = prices.price_at_or_before(asset, date) {
            return Some(price);
        }

        let latest = transactions.iter().rev().find(|tx| tx.asset == asset)?;
        let currency = self.classifier.classify(latest.currency_label.as_deref());
        let placeholder = self.placeholder_for(currency);
        let price = prices.price_at_or_before(placeholder, date)?;

        log::debug!("{asset}: no own price on {date}, using {placeholder} ({currency})");

        if currency == CurrencyKind::Local {
            // Unconverted when no usable rate exists, matching the normalizer.
            return Some(
                self.currency_service
                    .local_to_foreign(price, date, rates)
                    .unwrap_or(price),
            );
        }
        Some(price)
    }

    /// Placeholder series name for a currency class.
    pub fn placeholder_for(&self, currency: CurrencyKind) -> &str {
        match currency {
            CurrencyKind::Foreign => &self.foreign_placeholder,
            CurrencyKind::Local | CurrencyKind::Unknown => &self.local_placeholder,
        }
    }
}

impl Default for PriceService {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
