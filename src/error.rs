use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionTally {
    pub expiry_window: usize,
    pub invalid_strike: usize,
    pub open_interest: usize,
    pub non_positive_bid: usize,
    pub bid_above_price: usize,
    pub far_otm_corrupted: usize,
    pub in_the_money: usize,
}

impl RejectionTally {
    pub fn total(&self) -> usize {
        self.expiry_window
            + self.invalid_strike
            + self.open_interest
            + self.non_positive_bid
            + self.bid_above_price
            + self.far_otm_corrupted
            + self.in_the_money
    }
}

impl Display for RejectionTally {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = [
            ("outside expiry window", self.expiry_window),
            ("non-positive strike", self.invalid_strike),
            ("open interest too low", self.open_interest),
            ("no bid", self.non_positive_bid),
            ("bid above stock price", self.bid_above_price),
            ("corrupted far-OTM quote", self.far_otm_corrupted),
            ("in the money", self.in_the_money),
        ];
        let described = parts
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| format!("{count} {label}"))
            .collect::<Vec<_>>();
        if described.is_empty() {
            write!(f, "empty chain")
        } else {
            write!(f, "{}", described.join(", "))
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("no eligible contracts among {total} quoted ({rejections})")]
    NoEligibleContracts {
        total: usize,
        rejections: RejectionTally,
    },
    #[error("insufficient price history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },
    #[error("upstream data unavailable: {source_name}: {detail}")]
    UpstreamUnavailable { source_name: String, detail: String },
}

impl EngineError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn upstream(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        EngineError::UpstreamUnavailable {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "invalid_shares",
            EngineError::NoEligibleContracts { .. } => "no_liquid_options",
            EngineError::InsufficientHistory { .. } => "insufficient_history",
            EngineError::UpstreamUnavailable { .. } => "api_error",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            EngineError::InvalidInput { reason } => format!(
                "Invalid request. {reason} Shares must be a positive multiple of 100 for covered calls."
            ),
            EngineError::NoEligibleContracts { total, rejections } => format!(
                "No liquid options found in the 7-45 day window. Checked {total} contracts ({rejections}). Try a more actively traded stock."
            ),
            EngineError::InsufficientHistory {
                required,
                available,
            } => format!(
                "Not enough price history to read the trend: {available} trading days available, {required} needed."
            ),
            EngineError::UpstreamUnavailable {
                source_name,
                detail,
            } => format!(
                "There was an error fetching market data ({source_name}: {detail}). Please try again in a moment."
            ),
        }
    }
}
