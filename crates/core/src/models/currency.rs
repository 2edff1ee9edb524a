use serde::{Deserialize, Serialize};

use super::settings::Settings;

/// Currency a transaction is denominated in, inferred from its free-text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKind {
    /// Local currency (pesos). Prices and amounts get divided by the FX rate.
    Local,
    /// Foreign currency (dollars). The unit every report is expressed in.
    Foreign,
    /// No keyword matched, or the label was absent.
    Unknown,
}

impl std::fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyKind::Local => write!(f, "Local"),
            CurrencyKind::Foreign => write!(f, "Foreign"),
            CurrencyKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Keyword-based currency classifier.
///
/// The normalizer, the netter and the price resolver all classify through
/// one instance of this type, so the three stages can never disagree on
/// what a label means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyClassifier {
    foreign_keywords: Vec<String>,
    local_keywords: Vec<String>,
}

impl CurrencyClassifier {
    /// Build a classifier from explicit keyword lists. Keywords are case-folded.
    pub fn new<F, L>(foreign_keywords: F, local_keywords: L) -> Self
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        Self {
            foreign_keywords: fold_all(foreign_keywords),
            local_keywords: fold_all(local_keywords),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.foreign_currency_keywords,
            &settings.local_currency_keywords,
        )
    }

    /// Classify a currency label.
    ///
    /// Foreign tokens win over local ones, so "Pesos / USD" is `Foreign`.
    /// Matching is substring-based on the trimmed, lower-cased label.
    pub fn classify(&self, label: Option<&str>) -> CurrencyKind {
        let Some(label) = label else {
            return CurrencyKind::Unknown;
        };
        let text = label.trim().to_lowercase();
        if text.is_empty() {
            return CurrencyKind::Unknown;
        }
        if self.foreign_keywords.iter().any(|k| text.contains(k.as_str())) {
            CurrencyKind::Foreign
        } else if self.local_keywords.iter().any(|k| text.contains(k.as_str())) {
            CurrencyKind::Local
        } else {
            CurrencyKind::Unknown
        }
    }
}

impl Default for CurrencyClassifier {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn fold_all<I>(keywords: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
