use crate::models::currency::{CurrencyClassifier, CurrencyKind};
use crate::models::price::ExchangeRateSeries;
use crate::models::transaction::Transaction;
use crate::services::currency_service::CurrencyService;

/// Restates local-currency transactions in foreign units.
///
/// Rows labelled `Local` get price and amount divided by the exchange rate
/// in force on their date. `Foreign` and `Unknown` rows pass through. The
/// currency label is kept as-is, so running the normalizer over its own
/// output only ever touches rows still labelled local.
pub struct NormalizerService {
    classifier: CurrencyClassifier,
    currency_service: CurrencyService,
}

impl NormalizerService {
    pub fn new(classifier: CurrencyClassifier) -> Self {
        Self {
            classifier,
            currency_service: CurrencyService::new(),
        }
    }

    /// Return a normalized copy of `transactions`, in the same order.
    ///
    /// A local row with no usable rate, or one whose conversion would
    /// overflow, is left unconverted and logged.
    pub fn normalize(
        &self,
        transactions: &[Transaction],
        rates: &ExchangeRateSeries,
    ) -> Vec<Transaction> {
        transactions
            .iter()
            .map(|tx| self.normalize_one(tx, rates))
            .collect()
    }

    fn normalize_one(&self, tx: &Transaction, rates: &ExchangeRateSeries) -> Transaction {
        if self.classifier.classify(tx.currency_label.as_deref()) != CurrencyKind::Local {
            return tx.clone();
        }

        let Some(rate) = self.currency_service.usable_rate(rates, tx.date) else {
            log::warn!(
                "no usable exchange rate on or before {} for {} ({}); amount left in local currency",
                tx.date,
                tx.asset,
                tx.kind
            );
            return tx.clone();
        };

        match (tx.price.checked_div(rate), tx.amount.checked_div(rate)) {
            (Some(price), Some(amount)) => Transaction {
                price,
                amount,
                ..tx.clone()
            },
            _ => {
                log::warn!(
                    "exchange rate {rate} on {} overflows {} ({}); amount left in local currency",
                    tx.date,
                    tx.asset,
                    tx.kind
                );
                tx.clone()
            }
        }
    }
}

impl Default for NormalizerService {
    fn default() -> Self {
        Self::new(CurrencyClassifier::default())
    }
}
