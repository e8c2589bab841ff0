use crate::model::{Ladder, OptionMetrics, StrategyResult};
use anyhow::Result;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Table};
use csv::Writer;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs::File;
use std::path::Path;
use tracing::info;

pub fn summary_table(result: &StrategyResult) -> Table {
    let primary = &result.primary;
    let contract = &primary.contract;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Recommendation", ""]);
    let rows = [
        (
            "Sell",
            format!(
                "{} {} ${} calls exp {}",
                result.contracts,
                result.ticker,
                money(contract.strike),
                contract.expiration_date
            ),
        ),
        ("Stock price", format!("${}", money(result.current_price))),
        (
            "Moneyness",
            format!("{} ({}%)", moneyness_label(result), pct(primary.moneyness_pct)),
        ),
        (
            "Premium",
            format!(
                "${} / share (${} / contract)",
                money(contract.bid),
                money(primary.premium_per_contract)
            ),
        ),
        ("Total premium", format!("${}", money(primary.total_premium))),
        ("Days to expiry", contract.days_to_expiration.to_string()),
        ("Premium yield", format!("{}%", pct(primary.premium_yield_pct))),
        (
            "Annualized return",
            format!("{}%", pct(primary.annualized_return_pct)),
        ),
        (
            "Breakeven",
            format!(
                "${} ({}% downside protection)",
                money(primary.breakeven),
                pct(primary.downside_protection_pct)
            ),
        ),
        (
            "If assigned",
            format!(
                "${} ({}% return)",
                money(primary.max_profit_if_assigned),
                pct(primary.max_return_pct_if_assigned)
            ),
        ),
        ("Strategy", result.band.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

pub fn technical_table(result: &StrategyResult) -> Table {
    let t = &result.technical;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Indicator", "Value", "Signal"]);
    table.add_row(vec![
        Cell::new("RSI(14)"),
        Cell::new(pct(t.rsi14)),
        Cell::new(t.rsi_signal.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("MACD hist"),
        Cell::new(format!("{:+}", rounded(t.macd_histogram, 4))),
        Cell::new(t.macd_trend.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("vs SMA20"),
        Cell::new(format!("${}", money(t.sma20))),
        Cell::new(if t.above_sma20 { "above" } else { "below" }),
    ]);
    table.add_row(vec![
        Cell::new("vs SMA50"),
        Cell::new(format!("${}", money(t.sma50))),
        Cell::new(if t.above_sma50 { "above" } else { "below" }),
    ]);
    table.add_row(vec![
        Cell::new("Volume"),
        Cell::new(format!("{}x avg", fixed(t.volume_ratio, 2))),
        Cell::new(t.volume_signal.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Sentiment"),
        Cell::new(t.sentiment.to_string()),
        Cell::new(format!("{} assignment risk", t.assignment_risk)),
    ]);
    table
}

pub fn ladder_table(ladder: &Ladder) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Layer",
        "Weight",
        "Contracts",
        "Strike",
        "Expiry",
        "Premium/Share",
        "Total Premium",
        "OTM %",
    ]);
    for rung in &ladder.rungs {
        table.add_row(vec![
            Cell::new(rung.tier.to_string()),
            Cell::new(format!("{}%", rung.weight_pct)),
            Cell::new(rung.contracts.to_string()),
            Cell::new(format!("${}", money(rung.option.contract.strike))),
            Cell::new(rung.option.contract.expiration_date.to_string()),
            Cell::new(format!("${}", money(rung.option.contract.bid))),
            Cell::new(format!("${}", money(rung.premium))),
            Cell::new(pct(rung.option.otm_pct)),
        ]);
    }
    table
}

pub fn print_recommendation(result: &StrategyResult) -> Result<()> {
    println!("{}", summary_table(result));
    println!("{}", result.rationale);
    println!("{}", technical_table(result));
    println!("{}", result.technical.outlook);
    if let Some(ladder) = &result.ladder {
        println!("Layered alternative:");
        println!("{}", ladder_table(ladder));
        println!(
            "Total premium: ${} ({} contracts)",
            money(ladder.total_premium),
            ladder.total_contracts
        );
    }
    for warning in &result.warnings {
        println!("! {warning}");
    }
    Ok(())
}

const EXPORT_HEADER: [&str; 10] = [
    "ticker",
    "tier",
    "weight_pct",
    "contracts",
    "strike",
    "expiration",
    "bid",
    "premium",
    "annualized_return_pct",
    "otm_pct",
];

fn allocation_row(
    ticker: &str,
    tier: &str,
    weight: Decimal,
    contracts: u32,
    option: &OptionMetrics,
    premium: Decimal,
) -> [String; 10] {
    [
        ticker.to_string(),
        tier.to_string(),
        weight.normalize().to_string(),
        contracts.to_string(),
        option.contract.strike.normalize().to_string(),
        option.contract.expiration_date.to_string(),
        option.contract.bid.normalize().to_string(),
        premium.normalize().to_string(),
        rounded(option.annualized_return_pct, 4).to_string(),
        rounded(option.otm_pct, 4).to_string(),
    ]
}

pub fn export_ladder_csv<P: AsRef<Path>>(result: &StrategyResult, path: P) -> Result<()> {
    let mut writer = Writer::from_writer(File::create(path)?);
    writer.write_record(EXPORT_HEADER)?;
    match &result.ladder {
        Some(ladder) => {
            for rung in &ladder.rungs {
                writer.write_record(allocation_row(
                    &result.ticker,
                    &rung.tier.to_string(),
                    rung.weight_pct,
                    rung.contracts,
                    &rung.option,
                    rung.premium,
                ))?;
            }
        }
        None => writer.write_record(allocation_row(
            &result.ticker,
            "Primary",
            Decimal::ONE_HUNDRED,
            result.contracts,
            &result.primary,
            result.primary.total_premium,
        ))?,
    }
    writer.flush()?;
    info!(target: "export.csv", ticker = %result.ticker, "wrote allocation to disk");
    Ok(())
}

fn moneyness_label(result: &StrategyResult) -> &'static str {
    if result.primary.is_itm {
        "ITM"
    } else if result.primary.moneyness_pct.abs() < Decimal::ONE {
        "ATM"
    } else {
        "OTM"
    }
}

fn rounded(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn fixed(value: Decimal, dp: u32) -> String {
    format!("{:.*}", dp as usize, rounded(value, dp))
}

fn money(value: Decimal) -> String {
    fixed(value, 2)
}

fn pct(value: Decimal) -> String {
    fixed(value, 1)
}
