use portfolio_analyzer_core::models::report::{CompositionReport, DetailReport, EvolutionReport};
use rust_decimal::Decimal;
use std::io::Write;

fn money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn qty(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn composition(out: &mut impl Write, report: &CompositionReport) -> std::io::Result<()> {
    writeln!(out, "Composition as of {}", report.as_of)?;
    writeln!(
        out,
        "{:<14} {:>14} {:>12} {:>14} {:>14} {:>12} {:>12} {:>14}",
        "asset", "quantity", "price", "value", "invested", "proceeds", "income", "gain"
    )?;
    for row in &report.rows {
        writeln!(
            out,
            "{:<14} {:>14} {:>12} {:>14} {:>14} {:>12} {:>12} {:>14}",
            row.asset,
            qty(row.quantity),
            money(row.price),
            money(row.market_value),
            money(row.capital_invested),
            money(row.proceeds),
            money(row.income),
            money(row.total_gain)
        )?;
    }
    let s = &report.summary;
    writeln!(out)?;
    writeln!(out, "positions:   {}", s.asset_count)?;
    writeln!(out, "value:       {}", money(s.total_market_value))?;
    writeln!(out, "invested:    {}", money(s.total_invested))?;
    writeln!(out, "net flows:   {}", money(s.net_flows))?;
    writeln!(out, "gain:        {} ({}%)", money(s.total_gain), money(s.gain_pct))?;
    unpriced(out, &report.unpriced_assets)
}

pub fn evolution(out: &mut impl Write, report: &EvolutionReport) -> std::io::Result<()> {
    writeln!(out, "Evolution {} .. {}", report.start, report.end)?;
    writeln!(
        out,
        "{:<14} {:>14} {:>12} {:>14} {:>14} {:>12} {:>12} {:>14}",
        "asset", "quantity", "price", "value end", "value start", "proceeds", "income", "gain"
    )?;
    for row in &report.rows {
        writeln!(
            out,
            "{:<14} {:>14} {:>12} {:>14} {:>14} {:>12} {:>12} {:>14}",
            row.asset,
            qty(row.quantity_end),
            money(row.price_end),
            money(row.market_value_end),
            money(row.value_at_start),
            money(row.proceeds_in_period),
            money(row.income_in_period),
            money(row.total_gain)
        )?;
    }
    let s = &report.summary;
    writeln!(out)?;
    writeln!(out, "assets:      {}", s.asset_count)?;
    writeln!(out, "value start: {}", money(s.total_value_start))?;
    writeln!(out, "value end:   {}", money(s.total_value_end))?;
    writeln!(out, "net flows:   {}", money(s.net_flows))?;
    writeln!(out, "gain:        {} ({}%)", money(s.total_gain), money(s.gain_pct))?;
    unpriced(out, &report.unpriced_assets)
}

pub fn detail(out: &mut impl Write, report: &DetailReport) -> std::io::Result<()> {
    writeln!(out, "{} from {} to {}", report.asset, report.start, report.end)?;
    writeln!(
        out,
        "{:<12} {:<28} {:>14} {:>12} {:>14}",
        "date", "operation", "quantity", "price", "value"
    )?;
    for row in &report.rows {
        writeln!(
            out,
            "{:<12} {:<28} {:>14} {:>12} {:>14}",
            row.date,
            row.operation_label,
            qty(row.quantity),
            money(row.price),
            money(row.value)
        )?;
    }
    Ok(())
}

fn unpriced(out: &mut impl Write, assets: &[String]) -> std::io::Result<()> {
    if !assets.is_empty() {
        writeln!(out, "unpriced:    {}", assets.join(", "))?;
    }
    Ok(())
}
