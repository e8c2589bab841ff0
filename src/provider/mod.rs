use crate::config::EngineConfig;
use crate::engine::{StrategyEngine, StrategyRequest};
use crate::error::EngineError;
use crate::model::{PriceBar, PriceSeries, RawOptionContract, StrategyResult};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_quote(&self, ticker: &str) -> Result<Decimal>;
    async fn get_option_chain(&self, ticker: &str) -> Result<Vec<RawOptionContract>>;
    async fn get_price_history(&self, ticker: &str, lookback_days: u32) -> Result<PriceSeries>;
}

#[derive(Debug, Deserialize)]
struct ChainRow {
    strike: Decimal,
    expiration_date: NaiveDate,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
    open_interest: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    date: NaiveDate,
    close: Decimal,
    volume: u64,
}

#[derive(Debug, Clone)]
pub struct CsvMarketData {
    root: PathBuf,
}

impl CsvMarketData {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn ticker_dir(&self, ticker: &str) -> PathBuf {
        self.root.join(ticker.to_ascii_uppercase())
    }

    fn read_chain(path: &Path) -> Result<Vec<RawOptionContract>> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        reader
            .deserialize::<ChainRow>()
            .map(|row| {
                let row = row.with_context(|| format!("bad row in {}", path.display()))?;
                // Missing quotes come through as empty cells and mean no market.
                Ok(RawOptionContract {
                    strike: row.strike,
                    expiration_date: row.expiration_date,
                    bid: row.bid.unwrap_or_default(),
                    ask: row.ask.unwrap_or_default(),
                    open_interest: row.open_interest.unwrap_or_default(),
                })
            })
            .collect()
    }

    fn read_history(path: &Path) -> Result<Vec<PriceBar>> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut bars = reader
            .deserialize::<HistoryRow>()
            .map(|row| {
                let row = row.with_context(|| format!("bad row in {}", path.display()))?;
                Ok(PriceBar {
                    date: row.date,
                    close: row.close,
                    volume: row.volume,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for CsvMarketData {
    async fn get_quote(&self, ticker: &str) -> Result<Decimal> {
        let path = self.ticker_dir(ticker).join("quote.txt");
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let price = Decimal::from_str(raw.trim())
            .with_context(|| format!("invalid quote in {}", path.display()))?;
        Ok(price)
    }

    async fn get_option_chain(&self, ticker: &str) -> Result<Vec<RawOptionContract>> {
        Self::read_chain(&self.ticker_dir(ticker).join("chain.csv"))
    }

    async fn get_price_history(&self, ticker: &str, lookback_days: u32) -> Result<PriceSeries> {
        let bars = Self::read_history(&self.ticker_dir(ticker).join("history.csv"))?;
        let Some(last) = bars.last().map(|bar| bar.date) else {
            return Ok(PriceSeries::default());
        };
        let cutoff = last - chrono::Duration::days(i64::from(lookback_days));
        Ok(PriceSeries::new(
            bars.into_iter().filter(|bar| bar.date > cutoff).collect(),
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TickerData {
    pub quote: Option<Decimal>,
    pub chain: Option<Vec<RawOptionContract>>,
    pub history: Option<PriceSeries>,
}

pub struct StaticMarketData {
    data: HashMap<String, TickerData>,
    pub calls: Mutex<Vec<String>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_ticker(mut self, ticker: &str, data: TickerData) -> Self {
        self.data.insert(ticker.to_ascii_uppercase(), data);
        self
    }

    fn entry(&self, call: &str, ticker: &str) -> Result<&TickerData> {
        self.calls.lock().push(format!("{call}:{ticker}"));
        self.data
            .get(&ticker.to_ascii_uppercase())
            .ok_or_else(|| anyhow!("unknown ticker {ticker}"))
    }
}

impl Default for StaticMarketData {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn get_quote(&self, ticker: &str) -> Result<Decimal> {
        self.entry("quote", ticker)?
            .quote
            .ok_or_else(|| anyhow!("no quote for {ticker}"))
    }

    async fn get_option_chain(&self, ticker: &str) -> Result<Vec<RawOptionContract>> {
        self.entry("chain", ticker)?
            .chain
            .clone()
            .ok_or_else(|| anyhow!("no chain for {ticker}"))
    }

    async fn get_price_history(&self, ticker: &str, _lookback_days: u32) -> Result<PriceSeries> {
        self.entry("history", ticker)?
            .history
            .clone()
            .ok_or_else(|| anyhow!("no history for {ticker}"))
    }
}

async fn fetch<T, F>(what: &str, ticker: &str, deadline: Instant, fut: F) -> Option<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match timeout_at(deadline, fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(target: "provider", what, ticker, error = %err, "fetch failed");
            None
        }
        Err(_) => {
            warn!(target: "provider", what, ticker, "fetch timed out");
            None
        }
    }
}

pub async fn fetch_and_run<P: MarketDataProvider + ?Sized>(
    provider: &P,
    ticker: &str,
    shares_owned: i64,
    as_of: NaiveDate,
    config: &EngineConfig,
    deadline: Duration,
) -> Result<StrategyResult, EngineError> {
    let symbol = ticker.trim().to_ascii_uppercase();
    info!(target: "provider", ticker = %symbol, deadline = ?deadline, "fetching market data");
    let deadline = Instant::now() + deadline;

    let quote = fetch("quote", &symbol, deadline, provider.get_quote(&symbol)).await;
    let chain = fetch("chain", &symbol, deadline, provider.get_option_chain(&symbol)).await;
    let history = fetch(
        "history",
        &symbol,
        deadline,
        provider.get_price_history(&symbol, config.history_lookback_days),
    )
    .await;

    StrategyEngine::new(config).run(&StrategyRequest {
        ticker: &symbol,
        shares_owned,
        current_price: quote,
        raw_chain: chain.as_deref(),
        price_series: history.as_ref(),
        as_of,
    })
}
