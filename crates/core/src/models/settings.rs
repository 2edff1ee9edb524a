use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CoreError;

/// Engine configuration. Every field has a default, so a settings file only
/// needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Half-width, in calendar days, of the cross-currency netting window.
    pub netting_window_days: i64,

    /// Tokens that mark a currency label as foreign (dollar-denominated).
    pub foreign_currency_keywords: Vec<String>,

    /// Tokens that mark a currency label as local (peso-denominated).
    pub local_currency_keywords: Vec<String>,

    /// Placeholder price series used for foreign-currency assets with no own prices.
    pub foreign_placeholder_asset: String,

    /// Placeholder price series used for local or unclassified assets.
    pub local_placeholder_asset: String,

    /// Label of the synthetic first row of a detail report.
    pub opening_value_label: String,

    /// How input tables are laid out.
    pub layout: TableLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            netting_window_days: 7,
            foreign_currency_keywords: ["dólar", "dolar", "usd", "u$s", "u$", "us$", "billete"]
                .into_iter()
                .map(String::from)
                .collect(),
            local_currency_keywords: ["pesos", "peso", "ars"]
                .into_iter()
                .map(String::from)
                .collect(),
            foreign_placeholder_asset: "DUMMY USD".to_string(),
            local_placeholder_asset: "DUMMY Pesos".to_string(),
            opening_value_label: "Opening Value".to_string(),
            layout: TableLayout::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.netting_window_days < 0 {
            return Err(CoreError::ValidationError(format!(
                "netting_window_days must not be negative (got {})",
                self.netting_window_days
            )));
        }
        if self.layout.delimiter.len_utf8() != 1 {
            return Err(CoreError::ValidationError(format!(
                "delimiter '{}' must be a single-byte character",
                self.layout.delimiter
            )));
        }
        Ok(())
    }
}

/// Ingestion boundary parameters: header names, date format, delimiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// `chrono` format string for every date cell. Day-first by default.
    pub date_format: String,

    pub delimiter: char,

    /// Rows above the transactions header row (report banners and the like).
    pub transactions_skip_rows: usize,

    pub date_column: String,
    pub kind_column: String,
    pub asset_column: String,
    pub quantity_column: String,
    pub price_column: String,
    pub amount_column: String,

    /// Optional: when the column is absent every label reads as unknown.
    pub currency_column: String,

    /// Price-table column holding the exchange rate. `None` means the last column.
    pub exchange_rate_column: Option<String>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            date_format: "%d/%m/%Y".to_string(),
            delimiter: ',',
            transactions_skip_rows: 0,
            date_column: "Fecha de Liquidación".to_string(),
            kind_column: "Descripción".to_string(),
            asset_column: "RIC".to_string(),
            quantity_column: "Cantidad".to_string(),
            price_column: "Precio Promedio Ponderado".to_string(),
            amount_column: "Importe".to_string(),
            currency_column: "Moneda".to_string(),
            exchange_rate_column: None,
        }
    }
}
