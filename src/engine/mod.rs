use crate::compose::{compose, PositionContext};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ladder::build_ladder;
use crate::metrics::compute_all;
use crate::model::{normalize_ticker, PriceSeries, RawOptionContract, StrategyResult};
use crate::policy::{eligible_for_primary, select_primary};
use crate::sanitize::Sanitizer;
use crate::technical::analyze;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct StrategyRequest<'a> {
    pub ticker: &'a str,
    pub shares_owned: i64,
    pub current_price: Option<Decimal>,
    pub raw_chain: Option<&'a [RawOptionContract]>,
    pub price_series: Option<&'a PriceSeries>,
    pub as_of: NaiveDate,
}

pub struct StrategyEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    fn validate_shares(&self, shares_owned: i64) -> Result<(u32, u32), EngineError> {
        let lot = i64::from(self.config.shares_per_contract);
        if shares_owned <= 0 || shares_owned % lot != 0 {
            return Err(EngineError::invalid(format!(
                "You provided {shares_owned} shares."
            )));
        }
        let shares = u32::try_from(shares_owned)
            .map_err(|_| EngineError::invalid(format!("{shares_owned} shares is too large.")))?;
        Ok((shares, shares / self.config.shares_per_contract))
    }

    pub fn run(&self, request: &StrategyRequest<'_>) -> Result<StrategyResult, EngineError> {
        let (shares_owned, contracts) = self.validate_shares(request.shares_owned)?;
        let ticker = normalize_ticker(request.ticker)
            .ok_or_else(|| EngineError::invalid("Ticker is empty."))?;

        let current_price = request
            .current_price
            .ok_or_else(|| EngineError::upstream("quote", format!("no price for {ticker}")))?;
        let raw_chain = request
            .raw_chain
            .ok_or_else(|| EngineError::upstream("option chain", format!("no chain for {ticker}")))?;
        let price_series = request.price_series.ok_or_else(|| {
            EngineError::upstream("price history", format!("no history for {ticker}"))
        })?;
        if current_price <= Decimal::ZERO {
            return Err(EngineError::invalid(format!(
                "Stock price {current_price} is not positive."
            )));
        }

        info!(
            target: "engine",
            ticker = %ticker,
            shares = shares_owned,
            price = %current_price,
            chain = raw_chain.len(),
            bars = price_series.len(),
            as_of = %request.as_of,
            "running covered call strategy"
        );

        let sanitized =
            Sanitizer::new(self.config).sanitize(raw_chain, current_price, request.as_of)?;
        let technical = analyze(price_series, self.config)?;

        let metrics = compute_all(
            &sanitized.contracts,
            current_price,
            shares_owned,
            self.config.shares_per_contract,
        );
        let (eligible, itm_dropped) =
            eligible_for_primary(metrics, current_price, self.config.otm_only);
        let mut rejections = sanitized.rejections;
        rejections.in_the_money += itm_dropped;
        if eligible.is_empty() {
            warn!(target: "engine", ticker = %ticker, itm = itm_dropped, "only in-the-money contracts left");
            return Err(EngineError::NoEligibleContracts {
                total: sanitized.total,
                rejections,
            });
        }

        let selection = select_primary(&eligible, &technical, current_price).ok_or(
            EngineError::NoEligibleContracts {
                total: sanitized.total,
                rejections,
            },
        )?;
        let ladder = build_ladder(
            &eligible,
            &technical,
            &selection.option,
            contracts,
            self.config,
        );

        let context = PositionContext {
            ticker,
            shares_owned,
            contracts,
            current_price,
            as_of: request.as_of,
        };
        let result = compose(context, selection, ladder, technical, Vec::new());
        info!(
            target: "engine",
            ticker = %result.ticker,
            strike = %result.primary.contract.strike,
            expiry = %result.primary.contract.expiration_date,
            annualized = %result.primary.annualized_return_pct.round_dp(2),
            laddered = result.ladder.is_some(),
            warnings = result.warnings.len(),
            "recommendation ready"
        );
        Ok(result)
    }
}

pub fn run_strategy(
    ticker: &str,
    shares_owned: i64,
    current_price: Decimal,
    raw_chain: &[RawOptionContract],
    price_series: &PriceSeries,
    as_of: NaiveDate,
) -> Result<StrategyResult, EngineError> {
    let config = EngineConfig::default();
    StrategyEngine::new(&config).run(&StrategyRequest {
        ticker,
        shares_owned,
        current_price: Some(current_price),
        raw_chain: Some(raw_chain),
        price_series: Some(price_series),
        as_of,
    })
}
