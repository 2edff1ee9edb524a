use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::io::Write;

use portfolio_analyzer_core::errors::CoreError;
use portfolio_analyzer_core::models::settings::Settings;
use portfolio_analyzer_core::PortfolioAnalyzer;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Fixture: a small brokerage export
// ═══════════════════════════════════════════════════════════════════

const LEDGER: &str = "\
Fecha de Liquidación,Descripción,RIC,Cantidad,Precio Promedio Ponderado,Importe,Moneda
01/01/2025,Compra,X,100,10,1000,Dólar
01/02/2025,Venta,X,-100,12,1200,Dólar
15/03/2025,Compra,X,50,12,600,Dólar
10/06/2025,Compra MEP,A,100,100,10000,Dólar
12/06/2025,Venta MEP,A,-100,15000,1500000,Pesos
05/01/2025,Compra,AL30,200,700,140000,Pesos
20/02/2025,Cupón,AL30,200,,10000,Pesos
10/03/2025,Compra,ON1,10,1,10,Dólar
10/04/2025,Compra,LETRA,1000,1100,1100,Pesos
01/03/2025,Transferencia,X,5,,0,Dólar
";

const PRICES: &str = "\
Fecha,X,AL30,DUMMY USD,DUMMY Pesos,Tipo de Cambio
01/01/2025,10,0.7,1,1000,1000
01/03/2025,15,0.8,1.1,1100,1100
01/06/2025,16,0.9,1.2,1200,1200
";

fn analyzer() -> PortfolioAnalyzer {
    PortfolioAnalyzer::from_readers(LEDGER.as_bytes(), PRICES.as_bytes(), Settings::default()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════

#[test]
fn loads_from_files_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("operaciones.csv");
    let prices = dir.path().join("precios.csv");
    std::fs::File::create(&ledger).unwrap().write_all(LEDGER.as_bytes()).unwrap();
    std::fs::File::create(&prices).unwrap().write_all(PRICES.as_bytes()).unwrap();

    let analyzer = PortfolioAnalyzer::from_csv_files(&ledger, &prices, Settings::default()).unwrap();
    assert_eq!(analyzer.market_data().transactions.len(), 9);
    assert_eq!(analyzer.market_data().exchange_rates.len(), 3);
}

#[test]
fn invalid_settings_are_rejected_before_loading() {
    let settings = Settings {
        netting_window_days: -1,
        ..Settings::default()
    };
    let err = PortfolioAnalyzer::from_readers(LEDGER.as_bytes(), PRICES.as_bytes(), settings).unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
}

#[test]
fn assets_are_distinct_and_sorted() {
    assert_eq!(analyzer().assets(), vec!["A", "AL30", "LETRA", "ON1", "X"]);
}

// ═══════════════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════════════

#[test]
fn prepared_ledger_is_normalized_and_netted() {
    let analyzer = analyzer();
    let prepared = analyzer.prepared_transactions();

    // the cross-currency MEP pair on asset A cancels out
    assert!(prepared.iter().all(|tx| tx.asset != "A"));
    assert_eq!(prepared.len(), 7);

    let al30_buy = prepared.iter().find(|tx| tx.asset == "AL30" && tx.kind == "Compra").unwrap();
    assert_eq!(al30_buy.amount, dec!(140));
    assert_eq!(al30_buy.price, dec!(0.7));
}

#[test]
fn loaded_tables_are_never_mutated() {
    let analyzer = analyzer();
    let before = analyzer.market_data().clone();
    let _ = analyzer.prepared_transactions();
    let _ = analyzer.current_composition(d(2025, 4, 1));
    assert_eq!(analyzer.market_data(), &before);
}

#[test]
fn repeated_queries_agree() {
    let analyzer = analyzer();
    assert_eq!(
        analyzer.current_composition(d(2025, 4, 1)),
        analyzer.current_composition(d(2025, 4, 1))
    );
}

#[test]
fn coupon_with_blank_quantity_reaches_income() {
    let ledger = "\
Fecha de Liquidación,Descripción,RIC,Cantidad,Precio Promedio Ponderado,Importe,Moneda
05/01/2025,Compra,AL30,100,0.7,70,Dólar
01/02/2025,Cupón,AL30,,,50,Dólar
";
    let analyzer = PortfolioAnalyzer::from_readers(ledger.as_bytes(), PRICES.as_bytes(), Settings::default()).unwrap();
    assert_eq!(analyzer.prepared_transactions().len(), 2);

    let report = analyzer.current_composition(d(2025, 4, 1));
    let al30 = &report.rows[0];
    assert_eq!(al30.income, dec!(50));
    // 100 * 0.8 - 70 + 50
    assert_eq!(al30.total_gain, dec!(60));

    let evolution = analyzer.evolution(d(2025, 1, 31), d(2025, 3, 31)).unwrap();
    assert_eq!(evolution.rows[0].income_in_period, dec!(50));
}

// ═══════════════════════════════════════════════════════════════════
// Current composition
// ═══════════════════════════════════════════════════════════════════

#[test]
fn composition_after_reset_and_reopen() {
    let report = analyzer().current_composition(d(2025, 4, 1));
    let assets: Vec<&str> = report.rows.iter().map(|r| r.asset.as_str()).collect();
    assert_eq!(assets, vec!["AL30", "ON1", "X"]);

    let x = &report.rows[2];
    assert_eq!(x.quantity, dec!(50));
    assert_eq!(x.capital_invested, dec!(600));
    assert_eq!(x.market_value, dec!(750));
    assert_eq!(x.total_gain, dec!(150));

    let al30 = &report.rows[0];
    assert_eq!(al30.market_value, dec!(160));
    assert_eq!(al30.income, dec!(10));
    assert_eq!(al30.total_gain, dec!(30));

    // ON1 has no own prices: valued with the dollar placeholder
    let on1 = &report.rows[1];
    assert_eq!(on1.price, dec!(1.1));
    assert_eq!(on1.market_value, dec!(11));

    assert_eq!(report.summary.total_market_value, dec!(921));
    assert_eq!(report.summary.total_invested, dec!(750));
    assert_eq!(report.summary.total_gain, dec!(181));
}

#[test]
fn composition_while_closed() {
    let report = analyzer().current_composition(d(2025, 3, 1));
    assert!(report.rows.iter().all(|r| r.asset != "X"));
}

#[test]
fn composition_values_local_asset_through_peso_placeholder() {
    let report = analyzer().current_composition(d(2025, 6, 30));
    let letra = report.rows.iter().find(|r| r.asset == "LETRA").unwrap();
    assert_eq!(letra.quantity, dec!(1000));
    assert_eq!(letra.capital_invested, dec!(1));
    // 1200 pesos / 1200 per dollar
    assert_eq!(letra.price, dec!(1));
    assert!(report.rows.iter().all(|r| r.asset != "A"));
}

// ═══════════════════════════════════════════════════════════════════
// Evolution & detail
// ═══════════════════════════════════════════════════════════════════

#[test]
fn evolution_over_first_quarter() {
    let report = analyzer().evolution(d(2025, 1, 31), d(2025, 3, 31)).unwrap();
    let assets: Vec<&str> = report.rows.iter().map(|r| r.asset.as_str()).collect();
    assert_eq!(assets, vec!["AL30", "ON1", "X"]);

    let x = report.rows.iter().find(|r| r.asset == "X").unwrap();
    assert_eq!(x.value_at_start, dec!(1600));
    assert_eq!(x.proceeds_in_period, dec!(1200));
    assert_eq!(x.market_value_end, dec!(750));
    assert_eq!(x.total_gain, dec!(350));

    let on1 = report.rows.iter().find(|r| r.asset == "ON1").unwrap();
    assert_eq!(on1.value_at_start, dec!(10));
    assert_eq!(on1.total_gain, dec!(1));

    assert_eq!(report.summary.total_value_start, dec!(1750));
    assert_eq!(report.summary.total_value_end, dec!(921));
    assert_eq!(report.summary.total_gain, dec!(381));
    assert!(report.unpriced_assets.is_empty());
}

#[test]
fn evolution_rejects_inverted_range() {
    let err = analyzer().evolution(d(2025, 3, 31), d(2025, 1, 31)).unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
}

#[test]
fn single_day_range_is_allowed() {
    assert!(analyzer().evolution(d(2025, 3, 31), d(2025, 3, 31)).is_ok());
}

#[test]
fn detail_lists_opening_value_then_operations() {
    let report = analyzer().asset_detail("X", d(2025, 1, 31), d(2025, 3, 31)).unwrap();
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.rows[0].operation_label, "Opening Value");
    assert_eq!(report.rows[0].value, dec!(1000));
    assert_eq!(report.rows[1].operation_label, "Venta");
    assert_eq!(report.rows[2].operation_label, "Compra");
}

#[test]
fn detail_uses_configured_opening_label() {
    let settings = Settings {
        opening_value_label: "Valor Inicial".into(),
        ..Settings::default()
    };
    let analyzer = PortfolioAnalyzer::from_readers(LEDGER.as_bytes(), PRICES.as_bytes(), settings).unwrap();
    let report = analyzer.asset_detail(" X ", d(2025, 1, 31), d(2025, 3, 31)).unwrap();
    assert_eq!(report.rows[0].operation_label, "Valor Inicial");
}

#[test]
fn detail_rejects_inverted_range() {
    let err = analyzer().asset_detail("X", d(2025, 3, 31), d(2025, 1, 31)).unwrap_err();
    assert!(matches!(err, CoreError::ValidationError(_)));
}

// ═══════════════════════════════════════════════════════════════════
// Lookups & export
// ═══════════════════════════════════════════════════════════════════

#[test]
fn resolve_price_follows_fallback_chain() {
    let analyzer = analyzer();
    assert_eq!(analyzer.resolve_price("X", d(2025, 3, 20)), Some(dec!(15)));
    assert_eq!(analyzer.resolve_price("ON1", d(2025, 6, 2)), Some(dec!(1.2)));
    assert_eq!(analyzer.resolve_price("LETRA", d(2025, 4, 15)), Some(dec!(1)));
    assert_eq!(analyzer.resolve_price("UNKNOWN", d(2025, 4, 15)), None);
}

#[test]
fn parse_date_accepts_layout_format_and_iso() {
    let analyzer = analyzer();
    assert_eq!(analyzer.parse_date("31/03/2025").unwrap(), d(2025, 3, 31));
    assert_eq!(analyzer.parse_date("2025-03-31").unwrap(), d(2025, 3, 31));
    assert!(matches!(analyzer.parse_date("yesterday"), Err(CoreError::InvalidDate(_))));
}

#[test]
fn reports_export_to_json() {
    let analyzer = analyzer();

    let composition = analyzer.current_composition(d(2025, 4, 1));
    let json = PortfolioAnalyzer::composition_to_json(&composition).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["as_of"], "2025-04-01");
    assert_eq!(value["rows"][2]["asset"], "X");
    assert_eq!(value["summary"]["asset_count"], 3);

    let evolution = analyzer.evolution(d(2025, 1, 31), d(2025, 3, 31)).unwrap();
    let json = PortfolioAnalyzer::evolution_to_json(&evolution).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["rows"].as_array().unwrap().len(), 3);

    let detail = analyzer.asset_detail("X", d(2025, 1, 31), d(2025, 3, 31)).unwrap();
    let json = PortfolioAnalyzer::detail_to_json(&detail).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["asset"], "X");
    assert_eq!(value["rows"][0]["operation_label"], "Opening Value");
}
