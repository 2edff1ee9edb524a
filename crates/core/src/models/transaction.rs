use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const BUY_KEYWORDS: &[&str] = &["compra"];
const SELL_KEYWORDS: &[&str] = &["venta"];
const INCOME_KEYWORDS: &[&str] = &[
    "cupón",
    "cupon",
    "dividendo",
    "dividend",
    "coupon",
    "amortización",
    "amortizacion",
];

/// Semantic class of a ledger entry, derived from its free-text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Acquiring nominals
    Buy,
    /// Disposing of nominals
    Sell,
    /// Dividend, coupon or amortization cash flow. Does not move the quantity.
    Income,
    /// Anything else in the ledger (transfers, fees, ...). Ignored by the engine.
    Other,
}

impl OperationKind {
    /// Case-insensitive substring match, checked Buy → Sell → Income.
    pub fn classify(label: &str) -> Self {
        let text = label.trim().to_lowercase();
        let has_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));
        if has_any(BUY_KEYWORDS) {
            OperationKind::Buy
        } else if has_any(SELL_KEYWORDS) {
            OperationKind::Sell
        } else if has_any(INCOME_KEYWORDS) {
            OperationKind::Income
        } else {
            OperationKind::Other
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Buy => write!(f, "Buy"),
            OperationKind::Sell => write!(f, "Sell"),
            OperationKind::Income => write!(f, "Income"),
            OperationKind::Other => write!(f, "Other"),
        }
    }
}

/// A single ledger row.
///
/// `seq` is the row's position in the input and breaks ties between rows
/// sharing a date. Sell quantities may arrive negative; consumers always
/// take the magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub seq: usize,

    pub date: NaiveDate,

    /// Raw operation label as found in the ledger (e.g., "Compra", "Venta MEP")
    pub kind: String,

    /// Asset identifier, trimmed
    pub asset: String,

    pub quantity: Decimal,

    /// False when the ledger cell was blank. Such rows read as 0 but are
    /// not zero-quantity rows for netting purposes.
    #[serde(default = "quantity_reported_default")]
    pub quantity_reported: bool,

    /// Unit price at execution
    pub price: Decimal,

    /// Total cash value of the row
    pub amount: Decimal,

    #[serde(default)]
    pub currency_label: Option<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        kind: impl Into<String>,
        asset: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            seq: 0,
            date,
            kind: kind.into().trim().to_string(),
            asset: asset.into().trim().to_string(),
            quantity,
            quantity_reported: true,
            price,
            amount,
            currency_label: None,
        }
    }

    pub fn with_currency(mut self, label: impl Into<String>) -> Self {
        self.currency_label = Some(label.into());
        self
    }

    /// Mark the quantity as absent from the ledger (read as 0).
    pub fn without_quantity(mut self) -> Self {
        self.quantity = Decimal::ZERO;
        self.quantity_reported = false;
        self
    }

    /// Quantity is exactly 0 and came from the ledger or from netting,
    /// not from a blank cell.
    pub fn is_zero_quantity(&self) -> bool {
        self.quantity_reported && self.quantity.is_zero()
    }

    pub fn with_seq(mut self, seq: usize) -> Self {
        self.seq = seq;
        self
    }

    pub fn operation(&self) -> OperationKind {
        OperationKind::classify(&self.kind)
    }

    /// Signed effect of this row on the held quantity: buys add, sells
    /// subtract their magnitude, everything else is neutral.
    pub fn quantity_delta(&self) -> Decimal {
        match self.operation() {
            OperationKind::Buy => self.quantity,
            OperationKind::Sell => -self.quantity.abs(),
            OperationKind::Income | OperationKind::Other => Decimal::ZERO,
        }
    }
}

fn quantity_reported_default() -> bool {
    true
}

/// Sort rows chronologically, breaking date ties by input order.
pub fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.seq.cmp(&b.seq)));
}
