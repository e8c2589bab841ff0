mod common;

use common::{as_of, call, neutral_series, overbought_series, oversold_series, series};
use covered_call::config::EngineConfig;
use covered_call::model::{LadderTier, Sentiment};
use covered_call::{run_strategy, EngineError, StrategyEngine, StrategyRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn single_otm_call_metrics() {
    let price = dec!(188.50);
    let chain = vec![call(dec!(195), dec!(3.20), 45, 500)];
    let result = run_strategy("aapl", 100, price, &chain, &neutral_series(price), as_of())
        .expect("recommendation");

    assert_eq!(result.ticker, "AAPL");
    assert_eq!(result.technical.sentiment, Sentiment::Neutral);
    assert_eq!(result.primary.contract.strike, dec!(195));
    assert_eq!(result.primary.contract.days_to_expiration, 45);
    assert_eq!(result.primary.premium_yield_pct.round_dp(2), dec!(1.64));
    assert_eq!(result.primary.annualized_return_pct.round_dp(1), dec!(13.3));
    assert_eq!(result.primary.breakeven, dec!(185.30));
    assert!(!result.band_widened);
    assert!(result.ladder.is_none(), "one contract cannot be laddered");
}

#[test]
fn annualized_return_is_exact() {
    let price = dec!(100);
    let chain = vec![
        call(dec!(102), dec!(1.37), 17, 80),
        call(dec!(104), dec!(0.93), 31, 80),
    ];
    let result = run_strategy("XYZ", 300, price, &chain, &neutral_series(price), as_of()).unwrap();
    let c = &result.primary.contract;
    let expected = (c.bid / c.strike * Decimal::ONE_HUNDRED) / Decimal::from(c.days_to_expiration)
        * Decimal::from(365);
    assert_eq!(result.primary.annualized_return_pct, expected);
}

#[test]
fn split_artifact_never_recommended() {
    let price = dec!(188);
    let corrupted = call(dec!(365), dec!(874), 30, 50);
    let only_corrupted = run_strategy(
        "NVDA",
        100,
        price,
        std::slice::from_ref(&corrupted),
        &neutral_series(price),
        as_of(),
    )
    .unwrap_err();
    match only_corrupted {
        EngineError::NoEligibleContracts { total, rejections } => {
            assert_eq!(total, 1);
            assert_eq!(rejections.bid_above_price, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let chain = vec![corrupted, call(dec!(192), dec!(2.10), 30, 400)];
    let result = run_strategy("NVDA", 100, price, &chain, &neutral_series(price), as_of()).unwrap();
    assert_eq!(result.primary.contract.strike, dec!(192));
}

#[test]
fn oversold_ladder_splits_forty_forty_twenty() {
    let price = dec!(100);
    let chain = vec![
        call(dec!(100), dec!(3.00), 30, 900),
        call(dec!(103), dec!(1.80), 30, 900),
        call(dec!(104), dec!(1.40), 30, 900),
        call(dec!(108), dec!(0.60), 30, 900),
    ];
    let result =
        run_strategy("MSFT", 2000, price, &chain, &oversold_series(price), as_of()).unwrap();
    assert_eq!(result.technical.sentiment, Sentiment::Oversold);

    let ladder = result.ladder.expect("oversold positions are laddered");
    let counts: Vec<(LadderTier, u32)> = ladder.rungs.iter().map(|r| (r.tier, r.contracts)).collect();
    assert_eq!(
        counts,
        vec![
            (LadderTier::Conservative, 8),
            (LadderTier::Balanced, 8),
            (LadderTier::Aggressive, 4),
        ]
    );
    assert_eq!(ladder.total_contracts, 20);
    assert_eq!(ladder.rungs[0].option.contract.strike, dec!(108));
    assert_eq!(ladder.rungs[1].option.contract.strike, dec!(103));
    assert_eq!(ladder.rungs[2].option.contract.strike, dec!(100));
    assert_eq!(ladder.rungs[1].premium, dec!(1440));
    assert_eq!(ladder.rungs[1].option, result.primary);
    assert!(result.warnings.iter().any(|w| w.starts_with("Oversold alert")));
}

#[test]
fn overbought_uses_aggressive_band_without_ladder() {
    let price = dec!(150);
    let chain = vec![
        call(dec!(151), dec!(2.50), 21, 300),
        call(dec!(160), dec!(0.90), 21, 300),
    ];
    let result =
        run_strategy("TSLA", 500, price, &chain, &overbought_series(price), as_of()).unwrap();
    assert_eq!(result.technical.sentiment, Sentiment::Overbought);
    assert_eq!(result.primary.contract.strike, dec!(151));
    assert!(result.ladder.is_none());
    assert!(result.warnings.iter().any(|w| w.starts_with("Overbought note")));
}

#[test]
fn shares_must_be_round_lots() {
    let price = dec!(50);
    let chain = vec![call(dec!(52), dec!(1), 30, 100)];
    for shares in [150, 0, -100] {
        let err = run_strategy("F", shares, price, &chain, &neutral_series(price), as_of())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }), "{shares}: {err:?}");
        assert_eq!(err.kind(), "invalid_shares");
    }
}

#[test]
fn primary_is_never_in_the_money() {
    let price = dec!(100);
    let chain = vec![
        call(dec!(90), dec!(11.50), 30, 500),
        call(dec!(95), dec!(7.00), 30, 500),
        call(dec!(101), dec!(1.10), 30, 500),
    ];
    let result = run_strategy("IBM", 100, price, &chain, &neutral_series(price), as_of()).unwrap();
    assert!(result.primary.contract.strike >= price);
    assert!(!result.primary.is_itm);
}

#[test]
fn only_itm_contracts_is_no_eligible() {
    let price = dec!(100);
    let chain = vec![call(dec!(95), dec!(6), 30, 500)];
    let err =
        run_strategy("IBM", 100, price, &chain, &neutral_series(price), as_of()).unwrap_err();
    match err {
        EngineError::NoEligibleContracts { rejections, .. } => {
            assert_eq!(rejections.in_the_money, 1)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn allow_itm_emits_warning() {
    let price = dec!(100);
    let chain = vec![call(dec!(95), dec!(6), 30, 500)];
    let config = EngineConfig {
        otm_only: false,
        ..EngineConfig::default()
    };
    let history = neutral_series(price);
    let result = StrategyEngine::new(&config)
        .run(&StrategyRequest {
            ticker: "IBM",
            shares_owned: 100,
            current_price: Some(price),
            raw_chain: Some(&chain),
            price_series: Some(&history),
            as_of: as_of(),
        })
        .unwrap();
    assert!(result.primary.is_itm);
    assert!(result.warnings.iter().any(|w| w.starts_with("ITM warning")));
    assert!(result.band_widened);
}

#[test]
fn short_history_is_reported() {
    let price = dec!(100);
    let chain = vec![call(dec!(102), dec!(1.5), 30, 500)];
    let err = run_strategy("IBM", 100, price, &chain, &series(&vec![price; 30]), as_of())
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientHistory {
            required: 50,
            available: 30
        }
    );
}

#[test]
fn missing_inputs_are_upstream_failures() {
    let config = EngineConfig::default();
    let chain = vec![call(dec!(102), dec!(1.5), 30, 500)];
    let engine = StrategyEngine::new(&config);
    let err = engine
        .run(&StrategyRequest {
            ticker: "IBM",
            shares_owned: 100,
            current_price: Some(dec!(100)),
            raw_chain: Some(&chain),
            price_series: None,
            as_of: as_of(),
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::UpstreamUnavailable { .. }));
    assert_eq!(err.kind(), "api_error");
}

#[test]
fn identical_inputs_give_identical_output() {
    let price = dec!(100);
    let chain = vec![
        call(dec!(100), dec!(3.00), 30, 900),
        call(dec!(103), dec!(1.80), 23, 900),
        call(dec!(107), dec!(0.75), 37, 900),
    ];
    let history = oversold_series(price);
    let first = run_strategy("AMD", 1200, price, &chain, &history, as_of()).unwrap();
    let second = run_strategy("AMD", 1200, price, &chain, &history, as_of()).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}
