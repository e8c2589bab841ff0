use crate::config::EngineConfig;
use crate::model::{Ladder, LadderRung, LadderTier, OptionMetrics, TechnicalSnapshot};
use crate::policy::{pct, profile_for, rank};
use rust_decimal::Decimal;
use tracing::{info, warn};

const CONSERVATIVE_MIN_OTM: Decimal = pct(5);
const CONSERVATIVE_MAX_OTM: Decimal = pct(10);

// Floored shares; the remainder lands on Balanced (index 1).
pub fn allocate(contracts: u32, weights: [u32; 3]) -> [u32; 3] {
    let mut counts = weights.map(|w| (u64::from(contracts) * u64::from(w) / 100) as u32);
    let assigned: u32 = counts.iter().sum();
    counts[1] += contracts.saturating_sub(assigned);
    counts
}

fn conservative_pick(metrics: &[OptionMetrics]) -> Option<&OptionMetrics> {
    metrics
        .iter()
        .filter(|m| m.otm_pct >= CONSERVATIVE_MIN_OTM && m.otm_pct <= CONSERVATIVE_MAX_OTM)
        .min_by(|a, b| b.otm_pct.cmp(&a.otm_pct).then_with(|| rank(a, b)))
}

fn aggressive_pick(metrics: &[OptionMetrics]) -> Option<&OptionMetrics> {
    metrics
        .iter()
        .filter(|m| m.otm_pct >= Decimal::ZERO)
        .min_by(|a, b| a.otm_pct.cmp(&b.otm_pct).then_with(|| rank(a, b)))
}

pub fn build_ladder(
    metrics: &[OptionMetrics],
    technical: &TechnicalSnapshot,
    primary: &OptionMetrics,
    contracts_available: u32,
    config: &EngineConfig,
) -> Option<Ladder> {
    let weights = profile_for(technical.sentiment).ladder_weights?;
    if contracts_available < config.ladder_min_contracts {
        info!(
            target: "ladder",
            contracts = contracts_available,
            min = config.ladder_min_contracts,
            "too few contracts to ladder"
        );
        return None;
    }

    // A wing that lands on the Balanced contract is folded into Balanced.
    let distinct = |pick: Option<&OptionMetrics>| {
        pick.filter(|m| m.contract != primary.contract).cloned()
    };
    let picks = [
        distinct(conservative_pick(metrics)),
        Some(primary.clone()),
        distinct(aggressive_pick(metrics)),
    ];
    let tiers = [
        LadderTier::Conservative,
        LadderTier::Balanced,
        LadderTier::Aggressive,
    ];

    let mut weights = weights;
    let mut counts = allocate(contracts_available, weights);
    for idx in [0usize, 2] {
        if picks[idx].is_none() && counts[idx] > 0 {
            warn!(
                target: "ladder.tier",
                tier = %tiers[idx],
                contracts = counts[idx],
                "no contract for tier, moving allocation to balanced"
            );
            counts[1] += counts[idx];
            counts[idx] = 0;
            weights[1] += weights[idx];
            weights[idx] = 0;
        }
    }

    let multiplier = Decimal::from(config.shares_per_contract);
    let rungs: Vec<LadderRung> = tiers
        .iter()
        .zip(picks)
        .zip(counts.iter().zip(weights))
        .filter_map(|((tier, pick), (&contracts, weight))| {
            let option = pick?;
            if contracts == 0 {
                return None;
            }
            let premium = option.contract.bid * Decimal::from(contracts) * multiplier;
            Some(LadderRung {
                tier: *tier,
                weight_pct: Decimal::from(weight),
                contracts,
                option,
                premium,
            })
        })
        .collect();
    if rungs.len() < 2 {
        info!(
            target: "ladder",
            sentiment = %technical.sentiment,
            "fewer than two distinct strikes, no ladder"
        );
        return None;
    }

    let total_contracts = rungs.iter().map(|r| r.contracts).sum();
    let total_premium = rungs.iter().map(|r| r.premium).sum();
    info!(
        target: "ladder",
        sentiment = %technical.sentiment,
        rungs = rungs.len(),
        contracts = total_contracts,
        premium = %total_premium,
        "ladder built"
    );
    Some(Ladder {
        rungs,
        total_contracts,
        total_premium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(20, [40, 40, 20], [8, 8, 4])]
    #[case(20, [33, 33, 34], [6, 8, 6])]
    #[case(3, [40, 40, 20], [1, 2, 0])]
    #[case(7, [33, 33, 34], [2, 3, 2])]
    #[case(101, [40, 40, 20], [40, 41, 20])]
    fn allocation_keeps_every_contract(
        #[case] contracts: u32,
        #[case] weights: [u32; 3],
        #[case] expected: [u32; 3],
    ) {
        let counts = allocate(contracts, weights);
        assert_eq!(counts, expected);
        assert_eq!(counts.iter().sum::<u32>(), contracts);
    }
}
