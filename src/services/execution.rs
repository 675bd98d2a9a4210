//! Collaborators the core reports to: order management and signal consumers.

use crate::error::EngineError;
use crate::models::quote::{QuoteLevel, QuoteSet};
use crate::models::risk::{ExitRequest, RiskLevels};
use crate::models::signal::Signal;
use crate::signals::context::ContextSummary;
use serde::{Deserialize, Serialize};

#[async_trait::async_trait]
pub trait ExecutionGateway: Send + Sync {
    async fn publish_quote_set(&self, asset: &str, set: &QuoteSet) -> Result<(), EngineError>;

    /// Cancel whichever levels of `set` are still resting.
    async fn cancel_quote_set(&self, asset: &str, set: &QuoteSet) -> Result<(), EngineError>;

    /// Quote levels the venue currently reports as open for `asset`.
    async fn open_quote_levels(&self, asset: &str) -> Result<Vec<QuoteLevel>, EngineError>;

    async fn position_open(&self, asset: &str) -> Result<bool, EngineError>;

    /// Signed notional position; positive is long.
    async fn position_usd(&self, asset: &str) -> Result<f64, EngineError>;
}

/// A directional signal handed to the execution side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub asset: String,
    pub signal: Signal,
    pub risk: Option<RiskLevels>,
    /// Share of the capital pool assigned to this asset, when pooling is on.
    pub allocation_usd: Option<f64>,
}

#[async_trait::async_trait]
pub trait SignalSink: Send + Sync {
    async fn report_signal(&self, report: &SignalReport) -> Result<(), EngineError>;

    /// Hybrid mode only; consumed by the advisory collaborator.
    async fn report_context_summary(&self, summary: &ContextSummary) -> Result<(), EngineError>;

    async fn report_exit(&self, request: &ExitRequest) -> Result<(), EngineError>;
}
