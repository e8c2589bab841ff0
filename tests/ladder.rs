mod common;

use common::{call, snapshot};
use covered_call::config::EngineConfig;
use covered_call::ladder::{allocate, build_ladder};
use covered_call::metrics::compute_all;
use covered_call::model::{Ladder, LadderTier, OptionMetrics, Sentiment};
use covered_call::policy::select_primary;
use covered_call::sanitize::sanitize;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn metrics(price: Decimal) -> Vec<OptionMetrics> {
    let chain = [
        call(dec!(100), dec!(2.90), 30, 800),
        call(dec!(102), dec!(2.00), 30, 800),
        call(dec!(103), dec!(1.60), 30, 800),
        call(dec!(106), dec!(0.80), 30, 800),
        call(dec!(109), dec!(0.40), 30, 800),
    ];
    let sanitized = sanitize(&chain, price, common::as_of()).unwrap();
    compute_all(&sanitized, price, 1000, 100)
}

fn ladder_for(
    metrics: &[OptionMetrics],
    sentiment: Sentiment,
    price: Decimal,
    contracts: u32,
) -> Option<Ladder> {
    let technical = snapshot(sentiment, price);
    let primary = select_primary(metrics, &technical, price)?.option;
    build_ladder(
        metrics,
        &technical,
        &primary,
        contracts,
        &EngineConfig::default(),
    )
}

#[test]
fn neutral_ladder_puts_remainder_on_balanced() {
    let price = dec!(100);
    let ladder = ladder_for(&metrics(price), Sentiment::Neutral, price, 10).expect("ladder");
    let counts: Vec<u32> = ladder.rungs.iter().map(|r| r.contracts).collect();
    assert_eq!(counts, vec![3, 4, 3]);
    assert_eq!(ladder.total_contracts, 10);
    assert_eq!(ladder.rungs[0].option.contract.strike, dec!(109));
    assert_eq!(ladder.rungs[2].option.contract.strike, dec!(100));
    let weights: Vec<Decimal> = ladder.rungs.iter().map(|r| r.weight_pct).collect();
    assert_eq!(weights, vec![dec!(33), dec!(33), dec!(34)]);
}

#[test]
fn decisive_sentiment_has_no_ladder() {
    let price = dec!(100);
    for sentiment in [Sentiment::Bullish, Sentiment::Bearish, Sentiment::Overbought] {
        assert!(ladder_for(&metrics(price), sentiment, price, 20).is_none());
    }
}

#[test]
fn too_few_contracts_has_no_ladder() {
    let price = dec!(100);
    assert!(ladder_for(&metrics(price), Sentiment::Oversold, price, 2).is_none());
}

#[test]
fn missing_conservative_tier_moves_to_balanced() {
    let price = dec!(100);
    let near_only: Vec<OptionMetrics> = metrics(price)
        .into_iter()
        .filter(|m| m.otm_pct < dec!(5))
        .collect();
    let ladder = ladder_for(&near_only, Sentiment::Oversold, price, 20).unwrap();
    let tiers: Vec<(LadderTier, u32)> = ladder.rungs.iter().map(|r| (r.tier, r.contracts)).collect();
    assert_eq!(
        tiers,
        vec![(LadderTier::Balanced, 16), (LadderTier::Aggressive, 4)]
    );
    assert_eq!(ladder.rungs[0].weight_pct, dec!(80));
    assert_eq!(ladder.total_contracts, 20);
}

#[test]
fn balanced_rung_is_the_given_primary() {
    let price = dec!(100);
    let all = metrics(price);
    let technical = snapshot(Sentiment::Neutral, price);
    let chosen = all
        .iter()
        .find(|m| m.contract.strike == dec!(103))
        .cloned()
        .unwrap();
    assert_ne!(
        select_primary(&all, &technical, price).unwrap().option.contract.strike,
        dec!(103)
    );
    let ladder =
        build_ladder(&all, &technical, &chosen, 10, &EngineConfig::default()).unwrap();
    let balanced = ladder
        .rungs
        .iter()
        .find(|r| r.tier == LadderTier::Balanced)
        .unwrap();
    assert_eq!(balanced.option, chosen);
}

#[test]
fn wing_on_the_balanced_strike_is_folded() {
    let price = dec!(100);
    let near: Vec<OptionMetrics> = metrics(price)
        .into_iter()
        .filter(|m| m.contract.strike == dec!(103) || m.contract.strike == dec!(109))
        .collect();
    let ladder = ladder_for(&near, Sentiment::Neutral, price, 10).unwrap();
    let tiers: Vec<(LadderTier, u32)> = ladder.rungs.iter().map(|r| (r.tier, r.contracts)).collect();
    assert_eq!(
        tiers,
        vec![(LadderTier::Conservative, 3), (LadderTier::Balanced, 7)]
    );
    assert_eq!(ladder.rungs[1].weight_pct, dec!(67));
    let strikes: Vec<Decimal> = ladder
        .rungs
        .iter()
        .map(|r| r.option.contract.strike)
        .collect();
    assert_eq!(strikes, vec![dec!(109), dec!(103)]);
}

#[test]
fn single_strike_chain_is_not_laddered() {
    let price = dec!(100);
    let only: Vec<OptionMetrics> = metrics(price)
        .into_iter()
        .filter(|m| m.contract.strike == dec!(103))
        .collect();
    assert!(ladder_for(&only, Sentiment::Neutral, price, 10).is_none());
}

proptest! {
    #[test]
    fn allocation_never_loses_contracts(
        contracts in 0u32..10_000,
        a in 0u32..=100,
        b in 0u32..=100,
    ) {
        prop_assume!(a + b <= 100);
        let weights = [a, b, 100 - a - b];
        let counts = allocate(contracts, weights);
        prop_assert_eq!(counts.iter().sum::<u32>(), contracts);
    }

    #[test]
    fn built_ladders_cover_every_contract(contracts in 3u32..500, oversold in any::<bool>()) {
        let price = dec!(100);
        let sentiment = if oversold { Sentiment::Oversold } else { Sentiment::Neutral };
        let ladder = ladder_for(&metrics(price), sentiment, price, contracts).unwrap();
        let sum: u32 = ladder.rungs.iter().map(|r| r.contracts).sum();
        prop_assert_eq!(sum, contracts);
        prop_assert_eq!(ladder.total_contracts, contracts);
    }
}
