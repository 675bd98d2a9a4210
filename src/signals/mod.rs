//! Directional signal generation.

pub mod context;
pub mod decision;
pub mod detector;
pub mod engine;

pub use context::{ContextSummary, MomentumLabel, StrategyContextFormatter, TrendLabel};
pub use decision::{check_exit, exit_plan, RiskCalculator, REWARD_RISK_RATIO};
pub use detector::SignalDetector;
pub use engine::{Evaluation, SignalEngine};
