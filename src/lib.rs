pub mod compose;
pub mod engine;
pub mod error;
pub mod ladder;
pub mod metrics;
pub mod model;
pub mod policy;
pub mod provider;
pub mod render;
pub mod sanitize;
pub mod technical;

pub mod config;

pub use engine::{run_strategy, StrategyEngine, StrategyRequest};
pub use error::EngineError;
