use chrono::NaiveDate;
use portfolio_analyzer_core::errors::CoreError;
use portfolio_analyzer_core::models::currency::{CurrencyClassifier, CurrencyKind};
use portfolio_analyzer_core::models::market_data::MarketData;
use portfolio_analyzer_core::models::price::{ExchangeRateSeries, PriceSeries};
use portfolio_analyzer_core::models::settings::{Settings, TableLayout};
use portfolio_analyzer_core::models::transaction::{
    sort_chronologically, OperationKind, Transaction,
};
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  OperationKind
// ═══════════════════════════════════════════════════════════════════

mod operation_kind {
    use super::*;

    #[test]
    fn buy_and_sell_labels() {
        assert_eq!(OperationKind::classify("Compra"), OperationKind::Buy);
        assert_eq!(OperationKind::classify("COMPRA MEP"), OperationKind::Buy);
        assert_eq!(OperationKind::classify("Venta"), OperationKind::Sell);
        assert_eq!(OperationKind::classify("  venta cable "), OperationKind::Sell);
    }

    #[test]
    fn income_labels_including_unaccented_and_english() {
        for label in [
            "Cupón",
            "cupon",
            "Dividendo en efectivo",
            "Cash dividend",
            "Coupon",
            "Amortización",
            "amortizacion parcial",
        ] {
            assert_eq!(OperationKind::classify(label), OperationKind::Income, "{label}");
        }
    }

    #[test]
    fn unrelated_labels_are_other() {
        assert_eq!(OperationKind::classify("Transferencia"), OperationKind::Other);
        assert_eq!(OperationKind::classify(""), OperationKind::Other);
    }

    #[test]
    fn display() {
        assert_eq!(OperationKind::Buy.to_string(), "Buy");
        assert_eq!(OperationKind::Income.to_string(), "Income");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Transaction
// ═══════════════════════════════════════════════════════════════════

mod transaction {
    use super::*;

    #[test]
    fn new_trims_asset_and_kind() {
        let tx = Transaction::new(d(2025, 1, 2), " Compra ", "  AL30 ", dec!(10), dec!(1), dec!(10));
        assert_eq!(tx.asset, "AL30");
        assert_eq!(tx.kind, "Compra");
        assert_eq!(tx.seq, 0);
        assert!(tx.currency_label.is_none());
    }

    #[test]
    fn sell_delta_uses_magnitude() {
        let negative = Transaction::new(d(2025, 1, 2), "Venta", "X", dec!(-4), dec!(1), dec!(4));
        let positive = Transaction::new(d(2025, 1, 2), "Venta", "X", dec!(4), dec!(1), dec!(4));
        assert_eq!(negative.quantity_delta(), dec!(-4));
        assert_eq!(positive.quantity_delta(), dec!(-4));
    }

    #[test]
    fn income_and_other_do_not_move_quantity() {
        let income = Transaction::new(d(2025, 1, 2), "Cupón", "X", dec!(3), dec!(0), dec!(12));
        let other = Transaction::new(d(2025, 1, 2), "Transferencia", "X", dec!(3), dec!(0), dec!(12));
        assert_eq!(income.quantity_delta(), dec!(0));
        assert_eq!(other.quantity_delta(), dec!(0));
    }

    #[test]
    fn sort_breaks_date_ties_by_input_position() {
        let mut rows = vec![
            Transaction::new(d(2025, 2, 1), "Venta", "X", dec!(-1), dec!(1), dec!(1)).with_seq(2),
            Transaction::new(d(2025, 1, 1), "Compra", "X", dec!(1), dec!(1), dec!(1)).with_seq(3),
            Transaction::new(d(2025, 2, 1), "Compra", "X", dec!(1), dec!(1), dec!(1)).with_seq(0),
        ];
        sort_chronologically(&mut rows);
        let order: Vec<usize> = rows.iter().map(|tx| tx.seq).collect();
        assert_eq!(order, vec![3, 0, 2]);
    }

    #[test]
    fn market_data_stamps_input_position() {
        let rows = vec![
            Transaction::new(d(2025, 1, 1), "Compra", "A", dec!(1), dec!(1), dec!(1)),
            Transaction::new(d(2025, 1, 1), "Compra", "B", dec!(1), dec!(1), dec!(1)),
        ];
        let data = MarketData::new(rows, PriceSeries::new(), ExchangeRateSeries::new());
        assert_eq!(data.transactions[0].seq, 0);
        assert_eq!(data.transactions[1].seq, 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  CurrencyClassifier
// ═══════════════════════════════════════════════════════════════════

mod currency_classifier {
    use super::*;

    #[test]
    fn default_keywords() {
        let c = CurrencyClassifier::default();
        assert_eq!(c.classify(Some("Dólares")), CurrencyKind::Foreign);
        assert_eq!(c.classify(Some("USD")), CurrencyKind::Foreign);
        assert_eq!(c.classify(Some("Dolar Billete")), CurrencyKind::Foreign);
        assert_eq!(c.classify(Some("Pesos")), CurrencyKind::Local);
        assert_eq!(c.classify(Some(" ars ")), CurrencyKind::Local);
    }

    #[test]
    fn foreign_wins_over_local() {
        let c = CurrencyClassifier::default();
        assert_eq!(c.classify(Some("Pesos / USD")), CurrencyKind::Foreign);
    }

    #[test]
    fn absent_or_unmatched_is_unknown() {
        let c = CurrencyClassifier::default();
        assert_eq!(c.classify(None), CurrencyKind::Unknown);
        assert_eq!(c.classify(Some("   ")), CurrencyKind::Unknown);
        assert_eq!(c.classify(Some("Euros")), CurrencyKind::Unknown);
    }

    #[test]
    fn custom_keywords_are_case_folded() {
        let c = CurrencyClassifier::new(["EUR"], ["PLN", "Zloty"]);
        assert_eq!(c.classify(Some("eur")), CurrencyKind::Foreign);
        assert_eq!(c.classify(Some("ZLOTY")), CurrencyKind::Local);
        assert_eq!(c.classify(Some("USD")), CurrencyKind::Unknown);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PriceSeries / ExchangeRateSeries
// ═══════════════════════════════════════════════════════════════════

mod price_series {
    use super::*;

    #[test]
    fn lookup_takes_latest_at_or_before() {
        let mut s = PriceSeries::new();
        s.set_price("AL30", d(2025, 1, 10), dec!(50));
        s.set_price("AL30", d(2025, 1, 1), dec!(40));
        s.set_price("AL30", d(2025, 1, 20), dec!(60));

        assert_eq!(s.price_at_or_before("AL30", d(2024, 12, 31)), None);
        assert_eq!(s.price_at_or_before("AL30", d(2025, 1, 1)), Some(dec!(40)));
        assert_eq!(s.price_at_or_before("AL30", d(2025, 1, 15)), Some(dec!(50)));
        assert_eq!(s.price_at_or_before("AL30", d(2025, 6, 1)), Some(dec!(60)));
    }

    #[test]
    fn set_price_overwrites_same_date() {
        let mut s = PriceSeries::new();
        s.set_price("X", d(2025, 1, 1), dec!(1));
        s.set_price("X", d(2025, 1, 1), dec!(2));
        assert_eq!(s.total_entries(), 1);
        assert_eq!(s.price_at_or_before("X", d(2025, 1, 1)), Some(dec!(2)));
    }

    #[test]
    fn asset_keys_are_trimmed() {
        let mut s = PriceSeries::new();
        s.set_price(" GD30 ", d(2025, 1, 1), dec!(70));
        assert!(s.has_asset("GD30"));
        assert!(!s.has_asset("AL30"));
        assert_eq!(s.asset_count(), 1);
    }

    #[test]
    fn exchange_rates_from_iterator() {
        let rates: ExchangeRateSeries =
            [(d(2025, 1, 5), dec!(1100)), (d(2025, 1, 1), dec!(1000))].into_iter().collect();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates.rate_at_or_before(d(2025, 1, 3)), Some(dec!(1000)));
        assert_eq!(rates.rate_at_or_before(d(2025, 1, 5)), Some(dec!(1100)));
        assert_eq!(rates.rate_at_or_before(d(2024, 12, 31)), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.netting_window_days, 7);
        assert_eq!(s.foreign_placeholder_asset, "DUMMY USD");
        assert_eq!(s.local_placeholder_asset, "DUMMY Pesos");
        assert_eq!(s.layout, TableLayout::default());
        assert_eq!(s.layout.date_format, "%d/%m/%Y");
        assert!(s.layout.exchange_rate_column.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{"netting_window_days": 3, "layout": {"delimiter": ";"}}"#)
            .unwrap();
        assert_eq!(s.netting_window_days, 3);
        assert_eq!(s.layout.delimiter, ';');
        assert_eq!(s.layout.asset_column, "RIC");
        assert_eq!(s.local_placeholder_asset, "DUMMY Pesos");
    }

    #[test]
    fn negative_window_is_rejected() {
        assert!(Settings::from_json(r#"{"netting_window_days": -1}"#).is_err());
    }

    #[test]
    fn multibyte_delimiter_is_rejected() {
        assert!(Settings::from_json(r#"{"layout": {"delimiter": "¦"}}"#).is_err());
    }

    #[test]
    fn loads_from_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ajustes.json");
        std::fs::write(&path, r#"{"netting_window_days": 4}"#).unwrap();

        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.netting_window_days, 4);
        assert_eq!(s.layout, TableLayout::default());
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        match Settings::from_file(&path) {
            Err(CoreError::FileIO(msg)) => assert!(msg.contains("missing.json"), "{msg}"),
            other => panic!("expected FileIO, got {other:?}"),
        }
    }

    #[test]
    fn serde_roundtrip() {
        let s = Settings::default();
        let json = serde_json::to_string(&s).unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(s, back);
    }
}
