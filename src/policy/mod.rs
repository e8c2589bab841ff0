use crate::model::{
    AssignmentRisk, BandLabel, OptionMetrics, Sentiment, StrikeBand, TechnicalSnapshot,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, warn};

pub(crate) const fn pct(value: u32) -> Decimal {
    Decimal::from_parts(value, 0, 0, false, 0)
}

const fn band(min: u32, max: u32, label: BandLabel) -> StrikeBand {
    StrikeBand {
        min_otm_pct: pct(min),
        max_otm_pct: pct(max),
        label,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SentimentProfile {
    pub sentiment: Sentiment,
    pub risk: AssignmentRisk,
    pub band: StrikeBand,
    pub ladder_weights: Option<[u32; 3]>,
    pub outlook: &'static str,
    pub reason: &'static str,
}

pub const POLICY_TABLE: [SentimentProfile; 5] = [
    SentimentProfile {
        sentiment: Sentiment::Bullish,
        risk: AssignmentRisk::High,
        band: band(3, 10, BandLabel::Defensive),
        ladder_weights: None,
        outlook: "Bullish momentum: consider a higher strike or wait for a pullback.",
        reason: "Bullish momentum raises assignment risk, so the strike sits further out of the money while still collecting premium.",
    },
    SentimentProfile {
        sentiment: Sentiment::Neutral,
        risk: AssignmentRisk::Moderate,
        band: band(1, 5, BandLabel::Balanced),
        ladder_weights: Some([33, 33, 34]),
        outlook: "Mixed signals: an at-the-money or slightly out-of-the-money strike is appropriate.",
        reason: "Technical signals are mixed, so a slightly out-of-the-money strike balances premium against assignment risk.",
    },
    SentimentProfile {
        sentiment: Sentiment::Oversold,
        risk: AssignmentRisk::Moderate,
        band: band(2, 6, BandLabel::Balanced),
        ladder_weights: Some([40, 40, 20]),
        outlook: "Oversold: a bounce is possible. Consider layered strikes or wait for confirmation.",
        reason: "The stock is oversold and may bounce, so a balanced strike hedges the rebound.",
    },
    SentimentProfile {
        sentiment: Sentiment::Bearish,
        risk: AssignmentRisk::VeryLow,
        band: band(0, 3, BandLabel::Aggressive),
        ladder_weights: None,
        outlook: "Bearish: the stock may keep declining, which also erodes call premiums.",
        reason: "Assignment risk is low, so a near-the-money strike maximizes premium income.",
    },
    SentimentProfile {
        sentiment: Sentiment::Overbought,
        risk: AssignmentRisk::Low,
        band: band(0, 3, BandLabel::Aggressive),
        ladder_weights: None,
        outlook: "Overbought: a pullback is possible. Near-the-money strikes look safe.",
        reason: "The stock is overbought with pullback potential, so a near-the-money strike is appropriate.",
    },
];

pub fn profile_for(sentiment: Sentiment) -> &'static SentimentProfile {
    POLICY_TABLE
        .iter()
        .find(|profile| profile.sentiment == sentiment)
        .unwrap_or(&POLICY_TABLE[1])
}

pub fn eligible_for_primary(
    metrics: Vec<OptionMetrics>,
    current_price: Decimal,
    otm_only: bool,
) -> (Vec<OptionMetrics>, usize) {
    if !otm_only {
        return (metrics, 0);
    }
    let before = metrics.len();
    let kept: Vec<OptionMetrics> = metrics
        .into_iter()
        .filter(|m| m.contract.strike >= current_price)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

pub fn rank(a: &OptionMetrics, b: &OptionMetrics) -> Ordering {
    b.annualized_return_pct
        .cmp(&a.annualized_return_pct)
        .then_with(|| a.otm_pct.cmp(&b.otm_pct))
        .then_with(|| a.contract.expiration_date.cmp(&b.contract.expiration_date))
        .then_with(|| a.contract.strike.cmp(&b.contract.strike))
}

pub fn best_by_return<'m, I>(candidates: I) -> Option<&'m OptionMetrics>
where
    I: IntoIterator<Item = &'m OptionMetrics>,
{
    candidates.into_iter().min_by(|a, b| rank(a, b))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimarySelection {
    pub option: OptionMetrics,
    pub band: StrikeBand,
    pub widened: bool,
    pub rationale: String,
}

pub fn select_primary(
    metrics: &[OptionMetrics],
    technical: &TechnicalSnapshot,
    current_price: Decimal,
) -> Option<PrimarySelection> {
    let profile = profile_for(technical.sentiment);
    let band = profile.band;

    if let Some(best) = best_by_return(metrics.iter().filter(|m| band.contains(m.otm_pct))) {
        let rationale = format!(
            "Sentiment {} with {} assignment risk maps to the {} band. {} Selected the highest annualized return in the band ({}% OTM from ${}).",
            technical.sentiment,
            technical.assignment_risk,
            band,
            profile.reason,
            best.otm_pct.round_dp(1),
            current_price.round_dp(2),
        );
        info!(
            target: "policy",
            sentiment = %technical.sentiment,
            band = %band,
            strike = %best.contract.strike,
            annualized = %best.annualized_return_pct.round_dp(2),
            "primary selected inside band"
        );
        return Some(PrimarySelection {
            option: best.clone(),
            band,
            widened: false,
            rationale,
        });
    }

    let nearest = metrics.iter().min_by(|a, b| {
        band.distance(a.otm_pct)
            .cmp(&band.distance(b.otm_pct))
            .then_with(|| rank(a, b))
    })?;
    warn!(
        target: "policy.widen",
        sentiment = %technical.sentiment,
        band = %band,
        strike = %nearest.contract.strike,
        otm = %nearest.otm_pct.round_dp(2),
        "no contract inside band, using closest strike"
    );
    let rationale = format!(
        "Sentiment {} with {} assignment risk maps to the {} band, but no contract was quoted inside it. Selected the closest available strike ({}% OTM from ${}).",
        technical.sentiment,
        technical.assignment_risk,
        band,
        nearest.otm_pct.round_dp(1),
        current_price.round_dp(2),
    );
    Some(PrimarySelection {
        option: nearest.clone(),
        band,
        widened: true,
        rationale,
    })
}
