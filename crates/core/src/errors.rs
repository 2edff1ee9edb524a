use thiserror::Error;

/// Unified error type for the entire portfolio-analyzer-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Only input errors live here. Data-quality gaps (missing prices, missing
/// exchange rates, unparseable cells) degrade silently and are logged.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input tables ────────────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Malformed table: {0}")]
    Csv(String),

    #[error("Column '{column}' not found in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("Table has no usable header: {0}")]
    EmptyTable(String),

    // ── Query parameters ────────────────────────────────────────────
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── JSON ────────────────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        // csv wraps I/O failures too; keep them in the I/O bucket.
        if e.is_io_error() {
            return CoreError::FileIO(e.to_string());
        }
        CoreError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
