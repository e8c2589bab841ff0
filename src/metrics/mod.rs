use crate::model::{OptionMetrics, SanitizedOptionContract};
use rust_decimal::prelude::*;
use tracing::debug;

const DAYS_PER_YEAR: i64 = 365;

pub fn compute_metrics(
    contract: &SanitizedOptionContract,
    current_price: Decimal,
    shares_owned: u32,
    shares_per_contract: u32,
) -> OptionMetrics {
    let hundred = Decimal::ONE_HUNDRED;
    let shares = Decimal::from(shares_owned);
    let strike = contract.strike;
    let bid = contract.bid;

    let premium_yield_pct = if strike > Decimal::ZERO {
        bid / strike * hundred
    } else {
        Decimal::ZERO
    };
    let annualized_return_pct = if contract.days_to_expiration > 0 {
        premium_yield_pct / Decimal::from(contract.days_to_expiration)
            * Decimal::from(DAYS_PER_YEAR)
    } else {
        Decimal::ZERO
    };

    let (moneyness_pct, otm_pct, downside_protection_pct) = if current_price > Decimal::ZERO {
        (
            (strike - current_price) / current_price * hundred,
            (strike / current_price - Decimal::ONE) * hundred,
            bid / current_price * hundred,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    };

    let capital_gain_if_assigned = (strike - current_price) * shares;
    let max_profit_if_assigned = (strike - current_price + bid) * shares;
    let cost_basis = current_price * shares;
    let max_return_pct_if_assigned = if cost_basis > Decimal::ZERO {
        max_profit_if_assigned / cost_basis * hundred
    } else {
        Decimal::ZERO
    };

    let metrics = OptionMetrics {
        contract: contract.clone(),
        premium_yield_pct,
        annualized_return_pct,
        is_itm: strike < current_price,
        moneyness_pct,
        otm_pct,
        breakeven: current_price - bid,
        downside_protection_pct,
        premium_per_contract: bid * Decimal::from(shares_per_contract),
        total_premium: bid * shares,
        capital_gain_if_assigned,
        max_profit_if_assigned,
        max_return_pct_if_assigned,
    };
    debug!(
        target: "metrics",
        strike = %strike,
        dte = contract.days_to_expiration,
        annualized = %metrics.annualized_return_pct.round_dp(2),
        otm = %metrics.otm_pct.round_dp(2)
    );
    metrics
}

pub fn compute_all(
    contracts: &[SanitizedOptionContract],
    current_price: Decimal,
    shares_owned: u32,
    shares_per_contract: u32,
) -> Vec<OptionMetrics> {
    contracts
        .iter()
        .map(|contract| compute_metrics(contract, current_price, shares_owned, shares_per_contract))
        .collect()
}
