//! In-memory execution side used by the worker when no venue is attached.

use crate::error::EngineError;
use crate::models::quote::{QuoteLevel, QuoteSet};
use crate::models::risk::ExitRequest;
use crate::services::execution::{ExecutionGateway, SignalReport, SignalSink};
use crate::signals::context::ContextSummary;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Treats every published level as resting until cancelled. Positions are
/// whatever the caller sets; nothing ever fills.
#[derive(Default)]
pub struct PaperGateway {
    open_levels: RwLock<HashMap<String, Vec<QuoteLevel>>>,
    positions: RwLock<HashMap<String, f64>>,
    published: RwLock<HashMap<String, usize>>,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_position(&self, asset: &str, position_usd: f64) {
        self.positions
            .write()
            .await
            .insert(asset.to_string(), position_usd);
    }

    pub async fn publish_count(&self, asset: &str) -> usize {
        self.published.read().await.get(asset).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ExecutionGateway for PaperGateway {
    async fn publish_quote_set(&self, asset: &str, set: &QuoteSet) -> Result<(), EngineError> {
        let mut open = self.open_levels.write().await;
        open.entry(asset.to_string())
            .or_default()
            .extend(set.levels().copied());
        *self
            .published
            .write()
            .await
            .entry(asset.to_string())
            .or_insert(0) += 1;
        info!(
            asset = %asset,
            mid_price = set.mid_price,
            bias = %set.bias,
            bid_usd = set.total_bid_usd(),
            ask_usd = set.total_ask_usd(),
            "PaperGateway: published {} levels for {}",
            set.level_count(),
            asset
        );
        Ok(())
    }

    async fn cancel_quote_set(&self, asset: &str, set: &QuoteSet) -> Result<(), EngineError> {
        let mut open = self.open_levels.write().await;
        if let Some(levels) = open.get_mut(asset) {
            levels.retain(|resting| !set.levels().any(|level| level == resting));
        }
        Ok(())
    }

    async fn open_quote_levels(&self, asset: &str) -> Result<Vec<QuoteLevel>, EngineError> {
        Ok(self
            .open_levels
            .read()
            .await
            .get(asset)
            .cloned()
            .unwrap_or_default())
    }

    async fn position_open(&self, asset: &str) -> Result<bool, EngineError> {
        Ok(self.position_usd(asset).await? != 0.0)
    }

    async fn position_usd(&self, asset: &str) -> Result<f64, EngineError> {
        Ok(self.positions.read().await.get(asset).copied().unwrap_or(0.0))
    }
}

/// Writes every report to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSignalSink;

#[async_trait::async_trait]
impl SignalSink for LogSignalSink {
    async fn report_signal(&self, report: &SignalReport) -> Result<(), EngineError> {
        info!(
            asset = %report.asset,
            action = %report.signal.action,
            price = report.signal.price,
            stop_loss = ?report.risk.and_then(|r| r.stop_loss),
            take_profit = ?report.risk.map(|r| r.take_profit),
            allocation_usd = ?report.allocation_usd,
            "Signal: {}",
            report.signal.rationale
        );
        Ok(())
    }

    async fn report_context_summary(&self, summary: &ContextSummary) -> Result<(), EngineError> {
        info!(
            asset = %summary.asset,
            trend = ?summary.trend,
            momentum = ?summary.momentum,
            "Context:\n{}",
            summary.text
        );
        Ok(())
    }

    async fn report_exit(&self, request: &ExitRequest) -> Result<(), EngineError> {
        info!(
            asset = %request.asset,
            reason = request.reason.as_str(),
            price = request.price,
            "Exit requested for {} at {:.2}",
            request.asset,
            request.price
        );
        Ok(())
    }
}
