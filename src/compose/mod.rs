use crate::model::{
    AssignmentRisk, Ladder, OptionMetrics, Sentiment, StrategyResult, StrikeBand,
    TechnicalSnapshot,
};
use crate::policy::PrimarySelection;
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct PositionContext {
    pub ticker: String,
    pub shares_owned: u32,
    pub contracts: u32,
    pub current_price: Decimal,
    pub as_of: NaiveDate,
}

pub fn itm_warning(option: &OptionMetrics, current_price: Decimal) -> String {
    let itm_amount = current_price - option.contract.strike;
    format!(
        "ITM warning: the ${} strike is ${} ({}%) in the money. Assignment is likely and part of the premium is intrinsic value.",
        option.contract.strike.round_dp(2),
        itm_amount.round_dp(2),
        (-option.moneyness_pct).round_dp(1),
    )
}

fn sentiment_warning(technical: &TechnicalSnapshot) -> Option<String> {
    match (technical.sentiment, technical.assignment_risk) {
        (Sentiment::Oversold, _) => Some(format!(
            "Oversold alert (RSI {}): the stock may bounce. Consider the layered strikes or wait for confirmation before selling calls.",
            technical.rsi14.round_dp(1)
        )),
        (Sentiment::Overbought, _) => Some(format!(
            "Overbought note (RSI {}): a pullback is possible and upside may be limited.",
            technical.rsi14.round_dp(1)
        )),
        (Sentiment::Bullish, AssignmentRisk::High) => Some(
            "Strong bullish momentum: consider waiting for a pullback, a higher strike, or be prepared for early assignment."
                .to_string(),
        ),
        (Sentiment::Bearish, _) => Some(
            "Bearish signals: assignment risk is low but a further decline would cut into unrealized gains on the shares."
                .to_string(),
        ),
        _ => None,
    }
}

pub fn compose(
    context: PositionContext,
    selection: PrimarySelection,
    ladder: Option<Ladder>,
    technical: TechnicalSnapshot,
    mut warnings: Vec<String>,
) -> StrategyResult {
    let PrimarySelection {
        option: primary,
        band,
        widened,
        rationale,
    } = selection;

    if primary.is_itm {
        warnings.push(itm_warning(&primary, context.current_price));
    }
    if widened {
        warnings.push(widened_warning(&band));
    }
    if let Some(note) = sentiment_warning(&technical) {
        warnings.push(note);
    }

    StrategyResult {
        ticker: context.ticker,
        shares_owned: context.shares_owned,
        contracts: context.contracts,
        current_price: context.current_price,
        as_of: context.as_of,
        primary,
        band,
        band_widened: widened,
        rationale,
        ladder,
        technical,
        warnings,
    }
}

fn widened_warning(band: &StrikeBand) -> String {
    format!("No contract was quoted inside the preferred {band} band; the closest strike was used instead.")
}
