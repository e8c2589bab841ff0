use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{
    MaTrend, MacdTrend, PriceSeries, RsiSignal, Sentiment, TechnicalSnapshot, VolumeSignal,
};
use crate::policy::profile_for;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::info;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const SMA_SHORT: usize = 20;
pub const SMA_LONG: usize = 50;
pub const VOLUME_WINDOW: usize = 20;
const VOLUME_PRICE_LOOKBACK: usize = 5;

pub const MIN_HISTORY: usize = SMA_LONG;

pub fn sma(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let sum: Decimal = window.iter().copied().sum();
    Some(sum / Decimal::from(period))
}

pub fn ema_series(values: &[Decimal], span: usize) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };
    let alpha = Decimal::from(2) / Decimal::from(span + 1);
    let keep = Decimal::ONE - alpha;
    let mut prev = first;
    out.push(prev);
    for &value in &values[1..] {
        prev = alpha * value + keep * prev;
        out.push(prev);
    }
    out
}

pub fn rsi(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let changes: Vec<Decimal> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let n = Decimal::from(period);

    let (mut avg_gain, mut avg_loss) =
        changes[..period]
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(gain, loss), &ch| {
                if ch > Decimal::ZERO {
                    (gain + ch, loss)
                } else {
                    (gain, loss - ch)
                }
            });
    avg_gain /= n;
    avg_loss /= n;

    for &ch in &changes[period..] {
        let gain = ch.max(Decimal::ZERO);
        let loss = (-ch).max(Decimal::ZERO);
        avg_gain = (avg_gain * (n - Decimal::ONE) + gain) / n;
        avg_loss = (avg_loss * (n - Decimal::ONE) + loss) / n;
    }

    Some(rsi_from_averages(avg_gain, avg_loss))
}

fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if avg_gain.is_zero() && avg_loss.is_zero() {
        dec!(50)
    } else if avg_loss.is_zero() {
        hundred
    } else if avg_gain.is_zero() {
        Decimal::ZERO
    } else {
        hundred - hundred / (Decimal::ONE + avg_gain / avg_loss)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    pub macd: Decimal,
    pub signal: Decimal,
    pub histogram: Decimal,
    pub trend: MacdTrend,
}

pub fn macd(closes: &[Decimal]) -> Option<Macd> {
    if closes.len() < 2 {
        return None;
    }
    let fast = ema_series(closes, MACD_FAST);
    let slow = ema_series(closes, MACD_SLOW);
    let line: Vec<Decimal> = fast.iter().zip(&slow).map(|(f, s)| *f - *s).collect();
    let signal = ema_series(&line, MACD_SIGNAL);

    let last = line.len() - 1;
    let histogram = line[last] - signal[last];
    let prev_histogram = line[last - 1] - signal[last - 1];

    let trend = if line[last] > signal[last] && histogram > prev_histogram {
        MacdTrend::Bullish
    } else if line[last] < signal[last] && histogram < prev_histogram {
        MacdTrend::Bearish
    } else {
        MacdTrend::Neutral
    };

    Some(Macd {
        macd: line[last],
        signal: signal[last],
        histogram,
        trend,
    })
}

pub fn volume_ratio(volumes: &[Decimal]) -> Option<Decimal> {
    let average = sma(volumes, VOLUME_WINDOW)?;
    let latest = *volumes.last()?;
    if average.is_zero() {
        Some(Decimal::ONE)
    } else {
        Some(latest / average)
    }
}

fn volume_signal(ratio: Decimal, closes: &[Decimal]) -> VolumeSignal {
    let price_change = match closes.len() {
        n if n >= VOLUME_PRICE_LOOKBACK => closes[n - 1] - closes[n - VOLUME_PRICE_LOOKBACK],
        _ => Decimal::ZERO,
    };
    if ratio > dec!(1.5) && price_change > Decimal::ZERO {
        VolumeSignal::BullishVolume
    } else if ratio > dec!(1.5) && price_change < Decimal::ZERO {
        VolumeSignal::BearishVolume
    } else if ratio < dec!(0.5) {
        VolumeSignal::LowVolume
    } else {
        VolumeSignal::Normal
    }
}

fn ma_trend(above_sma20: bool, above_sma50: bool, sma20: Decimal, sma50: Decimal) -> MaTrend {
    let short_above_long = sma20 > sma50;
    match (above_sma20, above_sma50) {
        (true, true) if short_above_long => MaTrend::StrongBullish,
        (true, true) => MaTrend::Bullish,
        (false, false) if !short_above_long => MaTrend::StrongBearish,
        (false, false) => MaTrend::Bearish,
        _ => MaTrend::Neutral,
    }
}

fn rsi_signal(rsi: Decimal, config: &EngineConfig) -> RsiSignal {
    if rsi > config.overbought_rsi {
        RsiSignal::Overbought
    } else if rsi < config.oversold_rsi {
        RsiSignal::Oversold
    } else if rsi > dec!(65) {
        RsiSignal::NearOverbought
    } else if rsi > dec!(55) {
        RsiSignal::Bullish
    } else if rsi < dec!(45) {
        RsiSignal::Bearish
    } else {
        RsiSignal::Neutral
    }
}

pub fn classify(
    price: Decimal,
    rsi14: Decimal,
    sma20: Decimal,
    sma50: Decimal,
    macd: Decimal,
    macd_signal: Decimal,
    config: &EngineConfig,
) -> Sentiment {
    if rsi14 < config.oversold_rsi {
        Sentiment::Oversold
    } else if rsi14 > config.overbought_rsi {
        Sentiment::Overbought
    } else if price > sma20 && price > sma50 && macd > macd_signal {
        Sentiment::Bullish
    } else if price < sma20 && price < sma50 && macd < macd_signal {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

pub fn analyze(
    series: &PriceSeries,
    config: &EngineConfig,
) -> Result<TechnicalSnapshot, EngineError> {
    let insufficient = || EngineError::InsufficientHistory {
        required: MIN_HISTORY,
        available: series.len(),
    };
    if series.len() < MIN_HISTORY {
        return Err(insufficient());
    }

    let closes = series.closes();
    let volumes = series.volumes();
    let price = series.last_close().ok_or_else(insufficient)?;

    let rsi14 = rsi(&closes, RSI_PERIOD).ok_or_else(insufficient)?;
    let macd = macd(&closes).ok_or_else(insufficient)?;
    let sma20 = sma(&closes, SMA_SHORT).ok_or_else(insufficient)?;
    let sma50 = sma(&closes, SMA_LONG).ok_or_else(insufficient)?;
    let volume_ratio = volume_ratio(&volumes).ok_or_else(insufficient)?;

    let above_sma20 = price > sma20;
    let above_sma50 = price > sma50;
    let sentiment = classify(price, rsi14, sma20, sma50, macd.macd, macd.signal, config);
    let profile = profile_for(sentiment);

    let snapshot = TechnicalSnapshot {
        price,
        rsi14,
        rsi_signal: rsi_signal(rsi14, config),
        macd: macd.macd,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        macd_trend: macd.trend,
        sma20,
        sma50,
        above_sma20,
        above_sma50,
        ma_trend: ma_trend(above_sma20, above_sma50, sma20, sma50),
        volume_ratio,
        volume_signal: volume_signal(volume_ratio, &closes),
        sentiment,
        assignment_risk: profile.risk,
        outlook: profile.outlook.to_string(),
    };

    info!(
        target: "technical",
        bars = series.len(),
        rsi = %snapshot.rsi14.round_dp(1),
        macd = %snapshot.macd.round_dp(4),
        signal = %snapshot.macd_signal.round_dp(4),
        sma20 = %snapshot.sma20.round_dp(2),
        sma50 = %snapshot.sma50.round_dp(2),
        sentiment = %snapshot.sentiment,
        risk = %snapshot.assignment_risk,
        "indicators computed"
    );
    Ok(snapshot)
}
