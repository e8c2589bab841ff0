use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub fn normalize_ticker(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawOptionContract {
    pub strike: Decimal,
    pub expiration_date: NaiveDate,
    pub bid: Decimal,
    pub ask: Decimal,
    pub open_interest: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Decimal,
    pub volume: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceSeries {
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn volumes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|bar| Decimal::from(bar.volume)).collect()
    }

    pub fn last_close(&self) -> Option<Decimal> {
        self.bars.last().map(|bar| bar.close)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SanitizedOptionContract {
    pub strike: Decimal,
    pub expiration_date: NaiveDate,
    pub bid: Decimal,
    pub ask: Decimal,
    pub open_interest: u64,
    pub days_to_expiration: i64,
}

impl SanitizedOptionContract {
    pub fn from_raw(raw: &RawOptionContract, days_to_expiration: i64) -> Self {
        Self {
            strike: raw.strike,
            expiration_date: raw.expiration_date,
            bid: raw.bid,
            ask: raw.ask,
            open_interest: raw.open_interest,
            days_to_expiration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionMetrics {
    pub contract: SanitizedOptionContract,
    pub premium_yield_pct: Decimal,
    pub annualized_return_pct: Decimal,
    pub is_itm: bool,
    pub moneyness_pct: Decimal,
    pub otm_pct: Decimal,
    pub breakeven: Decimal,
    pub downside_protection_pct: Decimal,
    pub premium_per_contract: Decimal,
    pub total_premium: Decimal,
    pub capital_gain_if_assigned: Decimal,
    pub max_profit_if_assigned: Decimal,
    pub max_return_pct_if_assigned: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
    Oversold,
    Overbought,
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Bullish => write!(f, "bullish"),
            Sentiment::Bearish => write!(f, "bearish"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Oversold => write!(f, "oversold"),
            Sentiment::Overbought => write!(f, "overbought"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssignmentRisk {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl Display for AssignmentRisk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentRisk::High => write!(f, "high"),
            AssignmentRisk::Moderate => write!(f, "moderate"),
            AssignmentRisk::Low => write!(f, "low"),
            AssignmentRisk::VeryLow => write!(f, "very low"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    NearOverbought,
    Bullish,
    Bearish,
    Neutral,
}

impl Display for RsiSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RsiSignal::Overbought => write!(f, "overbought"),
            RsiSignal::Oversold => write!(f, "oversold"),
            RsiSignal::NearOverbought => write!(f, "near overbought"),
            RsiSignal::Bullish => write!(f, "bullish"),
            RsiSignal::Bearish => write!(f, "bearish"),
            RsiSignal::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Neutral,
}

impl Display for MacdTrend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MacdTrend::Bullish => write!(f, "bullish"),
            MacdTrend::Bearish => write!(f, "bearish"),
            MacdTrend::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MaTrend {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl Display for MaTrend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MaTrend::StrongBullish => write!(f, "strong bullish"),
            MaTrend::Bullish => write!(f, "bullish"),
            MaTrend::Neutral => write!(f, "neutral"),
            MaTrend::Bearish => write!(f, "bearish"),
            MaTrend::StrongBearish => write!(f, "strong bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VolumeSignal {
    BullishVolume,
    BearishVolume,
    LowVolume,
    Normal,
}

impl Display for VolumeSignal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeSignal::BullishVolume => write!(f, "bullish volume"),
            VolumeSignal::BearishVolume => write!(f, "bearish volume"),
            VolumeSignal::LowVolume => write!(f, "low volume"),
            VolumeSignal::Normal => write!(f, "normal"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TechnicalSnapshot {
    pub price: Decimal,
    pub rsi14: Decimal,
    pub rsi_signal: RsiSignal,
    pub macd: Decimal,
    pub macd_signal: Decimal,
    pub macd_histogram: Decimal,
    pub macd_trend: MacdTrend,
    pub sma20: Decimal,
    pub sma50: Decimal,
    pub above_sma20: bool,
    pub above_sma50: bool,
    pub ma_trend: MaTrend,
    pub volume_ratio: Decimal,
    pub volume_signal: VolumeSignal,
    pub sentiment: Sentiment,
    pub assignment_risk: AssignmentRisk,
    pub outlook: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BandLabel {
    Defensive,
    Balanced,
    Aggressive,
}

impl Display for BandLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BandLabel::Defensive => write!(f, "Defensive"),
            BandLabel::Balanced => write!(f, "Balanced"),
            BandLabel::Aggressive => write!(f, "Aggressive"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StrikeBand {
    pub min_otm_pct: Decimal,
    pub max_otm_pct: Decimal,
    pub label: BandLabel,
}

impl StrikeBand {
    pub fn contains(&self, otm_pct: Decimal) -> bool {
        otm_pct >= self.min_otm_pct && otm_pct <= self.max_otm_pct
    }

    pub fn distance(&self, otm_pct: Decimal) -> Decimal {
        if otm_pct < self.min_otm_pct {
            self.min_otm_pct - otm_pct
        } else if otm_pct > self.max_otm_pct {
            otm_pct - self.max_otm_pct
        } else {
            Decimal::ZERO
        }
    }
}

impl Display for StrikeBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}%-{}% OTM",
            self.label,
            self.min_otm_pct.normalize(),
            self.max_otm_pct.normalize()
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum LadderTier {
    Conservative,
    Balanced,
    Aggressive,
}

impl Display for LadderTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LadderTier::Conservative => write!(f, "Conservative"),
            LadderTier::Balanced => write!(f, "Balanced"),
            LadderTier::Aggressive => write!(f, "Aggressive"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LadderRung {
    pub tier: LadderTier,
    pub weight_pct: Decimal,
    pub contracts: u32,
    pub option: OptionMetrics,
    pub premium: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ladder {
    pub rungs: Vec<LadderRung>,
    pub total_contracts: u32,
    pub total_premium: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyResult {
    pub ticker: String,
    pub shares_owned: u32,
    pub contracts: u32,
    pub current_price: Decimal,
    pub as_of: NaiveDate,
    pub primary: OptionMetrics,
    pub band: StrikeBand,
    pub band_widened: bool,
    pub rationale: String,
    pub ladder: Option<Ladder>,
    pub technical: TechnicalSnapshot,
    pub warnings: Vec<String>,
}
