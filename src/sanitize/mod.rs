use crate::config::EngineConfig;
use crate::error::{EngineError, RejectionTally};
use crate::model::{RawOptionContract, SanitizedOptionContract};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ExpiryWindow,
    InvalidStrike,
    OpenInterest,
    NonPositiveBid,
    BidAbovePrice,
    FarOtmCorrupted,
}

impl Rejection {
    fn record(self, tally: &mut RejectionTally) {
        match self {
            Rejection::ExpiryWindow => tally.expiry_window += 1,
            Rejection::InvalidStrike => tally.invalid_strike += 1,
            Rejection::OpenInterest => tally.open_interest += 1,
            Rejection::NonPositiveBid => tally.non_positive_bid += 1,
            Rejection::BidAbovePrice => tally.bid_above_price += 1,
            Rejection::FarOtmCorrupted => tally.far_otm_corrupted += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedChain {
    pub contracts: Vec<SanitizedOptionContract>,
    pub total: usize,
    pub rejections: RejectionTally,
}

pub struct Sanitizer<'a> {
    config: &'a EngineConfig,
}

impl<'a> Sanitizer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn check(
        &self,
        raw: &RawOptionContract,
        current_price: Decimal,
        days_to_expiration: i64,
    ) -> Option<Rejection> {
        let cfg = self.config;
        if days_to_expiration < cfg.min_days_to_expiry || days_to_expiration > cfg.max_days_to_expiry
        {
            return Some(Rejection::ExpiryWindow);
        }
        if raw.strike <= Decimal::ZERO {
            return Some(Rejection::InvalidStrike);
        }
        if raw.open_interest <= cfg.min_open_interest {
            return Some(Rejection::OpenInterest);
        }
        if raw.bid <= Decimal::ZERO {
            return Some(Rejection::NonPositiveBid);
        }
        if raw.bid > current_price {
            return Some(Rejection::BidAbovePrice);
        }
        // Pre-split strikes can survive in the provider's chain with their old premiums.
        if raw.strike > current_price * cfg.far_otm_strike_multiple
            && raw.bid >= current_price * cfg.far_otm_max_bid_fraction
        {
            return Some(Rejection::FarOtmCorrupted);
        }
        None
    }

    pub fn sanitize(
        &self,
        raw_chain: &[RawOptionContract],
        current_price: Decimal,
        as_of: NaiveDate,
    ) -> Result<SanitizedChain, EngineError> {
        let mut rejections = RejectionTally::default();
        let mut contracts = Vec::with_capacity(raw_chain.len());

        for raw in raw_chain {
            let days = (raw.expiration_date - as_of).num_days();
            match self.check(raw, current_price, days) {
                Some(rule) => {
                    debug!(
                        target: "sanitize.reject",
                        strike = %raw.strike,
                        expiry = %raw.expiration_date,
                        bid = %raw.bid,
                        oi = raw.open_interest,
                        rule = ?rule
                    );
                    rule.record(&mut rejections);
                }
                None => contracts.push(SanitizedOptionContract::from_raw(raw, days)),
            }
        }

        info!(
            target: "sanitize",
            total = raw_chain.len(),
            kept = contracts.len(),
            rejected = rejections.total(),
            "chain sanitized"
        );

        if contracts.is_empty() {
            return Err(EngineError::NoEligibleContracts {
                total: raw_chain.len(),
                rejections,
            });
        }

        Ok(SanitizedChain {
            contracts,
            total: raw_chain.len(),
            rejections,
        })
    }
}

pub fn sanitize(
    raw_chain: &[RawOptionContract],
    current_price: Decimal,
    as_of: NaiveDate,
) -> Result<Vec<SanitizedOptionContract>, EngineError> {
    let config = EngineConfig::default();
    Sanitizer::new(&config)
        .sanitize(raw_chain, current_price, as_of)
        .map(|chain| chain.contracts)
}
