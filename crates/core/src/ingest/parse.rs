use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a numeric cell. Accepts plain decimals and scientific notation;
/// surrounding whitespace and a leading `+` are ignored. Empty → `None`.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse a date cell with `format`.
///
/// Spreadsheet exports often append a time ("01/02/2024 00:00:00"), so the
/// first whitespace-separated token is tried too. ISO dates are accepted as
/// a last resort.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let first_token = trimmed.split_whitespace().next().unwrap_or(trimmed);

    [trimmed, first_token]
        .into_iter()
        .flat_map(|candidate| [(candidate, format), (candidate, ISO_DATE_FORMAT)])
        .find_map(|(candidate, fmt)| NaiveDate::parse_from_str(candidate, fmt).ok())
}

