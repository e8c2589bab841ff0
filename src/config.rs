use crate::model::normalize_ticker;
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub min_days_to_expiry: i64,
    pub max_days_to_expiry: i64,
    pub min_open_interest: u64,
    pub far_otm_strike_multiple: Decimal,
    pub far_otm_max_bid_fraction: Decimal,
    pub otm_only: bool,
    // Pending product sign-off; 30 was also in use.
    pub oversold_rsi: Decimal,
    pub overbought_rsi: Decimal,
    pub ladder_min_contracts: u32,
    pub history_lookback_days: u32,
    pub shares_per_contract: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_days_to_expiry: 7,
            max_days_to_expiry: 45,
            min_open_interest: 10,
            far_otm_strike_multiple: dec!(1.5),
            far_otm_max_bid_fraction: dec!(0.2),
            otm_only: true,
            oversold_rsi: dec!(35),
            overbought_rsi: dec!(70),
            ladder_min_contracts: 3,
            history_lookback_days: 90,
            shares_per_contract: 100,
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "covered_call", author, version, about = "Covered-call strike recommender", long_about = None)]
pub struct Cli {
    #[arg(long, env = "TICKER")]
    pub ticker: String,

    #[arg(long, env = "SHARES")]
    pub shares: i64,

    #[arg(long, env = "MARKET_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, env = "AS_OF")]
    pub as_of: Option<String>,

    #[arg(long, env = "REQUEST_DEADLINE", default_value = "10s")]
    pub deadline: String,

    #[arg(long, env = "OVERSOLD_RSI", default_value = "35")]
    pub oversold_rsi: Decimal,

    #[arg(long, env = "OVERBOUGHT_RSI", default_value = "70")]
    pub overbought_rsi: Decimal,

    #[arg(long, env = "ALLOW_ITM", default_value_t = false)]
    pub allow_itm: bool,

    #[arg(long, env = "EXPORT_CSV")]
    pub export_csv: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub ticker: String,
    pub shares: i64,
    pub data_dir: PathBuf,
    pub as_of: NaiveDate,
    #[serde(skip)]
    pub deadline: Duration,
    pub engine: EngineConfig,
    pub export_csv: Option<PathBuf>,
    pub json: bool,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let ticker =
            normalize_ticker(&cli.ticker).ok_or_else(|| anyhow!("ticker must not be empty"))?;

        let as_of = match cli.as_of.as_deref() {
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("invalid as-of date: {raw}"))?,
            None => Utc::now().date_naive(),
        };

        let deadline = humantime::parse_duration(&cli.deadline)
            .with_context(|| format!("invalid deadline: {}", cli.deadline))?;

        let hundred = Decimal::ONE_HUNDRED;
        if cli.oversold_rsi <= Decimal::ZERO || cli.overbought_rsi >= hundred {
            return Err(anyhow!("rsi thresholds must lie strictly between 0 and 100"));
        }
        if cli.oversold_rsi >= cli.overbought_rsi {
            return Err(anyhow!("oversold rsi must be below overbought rsi"));
        }

        let engine = EngineConfig {
            oversold_rsi: cli.oversold_rsi,
            overbought_rsi: cli.overbought_rsi,
            otm_only: !cli.allow_itm,
            ..EngineConfig::default()
        };

        let config = AppConfig {
            ticker,
            shares: cli.shares,
            data_dir: cli.data_dir,
            as_of,
            deadline,
            engine,
            export_csv: cli.export_csv,
            json: cli.json,
        };

        info!(
            "config" = serde_json::to_string(&config).unwrap_or_default(),
            "configuration loaded"
        );
        Ok(config)
    }
}
