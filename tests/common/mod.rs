#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use covered_call::model::{
    AssignmentRisk, MaTrend, MacdTrend, PriceBar, PriceSeries, RawOptionContract, RsiSignal,
    Sentiment, TechnicalSnapshot, VolumeSignal,
};
use covered_call::policy::profile_for;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

pub fn call(strike: Decimal, bid: Decimal, days: i64, open_interest: u64) -> RawOptionContract {
    RawOptionContract {
        strike,
        expiration_date: as_of() + Duration::days(days),
        bid,
        ask: bid + dec!(0.15),
        open_interest,
    }
}

pub fn series(closes: &[Decimal]) -> PriceSeries {
    let start = as_of() - Duration::days(closes.len() as i64);
    PriceSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: start + Duration::days(i as i64),
                close: *close,
                volume: 2_000_000,
            })
            .collect(),
    )
}

/// Flat tape: RSI 50, price on its averages.
pub fn neutral_series(price: Decimal) -> PriceSeries {
    series(&vec![price; 60])
}

/// Straight decline: RSI 0.
pub fn oversold_series(end: Decimal) -> PriceSeries {
    let closes: Vec<Decimal> = (0..60i64).rev().map(|i| end + Decimal::from(i)).collect();
    series(&closes)
}

/// Straight rally: RSI 100.
pub fn overbought_series(end: Decimal) -> PriceSeries {
    let closes: Vec<Decimal> = (0..60i64).map(|i| end - Decimal::from(59 - i)).collect();
    series(&closes)
}

pub fn snapshot(sentiment: Sentiment, price: Decimal) -> TechnicalSnapshot {
    let profile = profile_for(sentiment);
    TechnicalSnapshot {
        price,
        rsi14: dec!(50),
        rsi_signal: RsiSignal::Neutral,
        macd: Decimal::ZERO,
        macd_signal: Decimal::ZERO,
        macd_histogram: Decimal::ZERO,
        macd_trend: MacdTrend::Neutral,
        sma20: price,
        sma50: price,
        above_sma20: false,
        above_sma50: false,
        ma_trend: MaTrend::Neutral,
        volume_ratio: Decimal::ONE,
        volume_signal: VolumeSignal::Normal,
        sentiment,
        assignment_risk: profile.risk,
        outlook: profile.outlook.to_string(),
    }
}

pub fn risk_of(sentiment: Sentiment) -> AssignmentRisk {
    profile_for(sentiment).risk
}
