//! Per-asset tick handling: one worker owns every piece of mutable state for
//! its asset and is driven by exactly one task.

use crate::core::allocation::AllocationPool;
use crate::core::backoff::FetchBackoff;
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::market::PriceWindow;
use crate::models::quote::{QuoteLevel, QuoteSet, QuoteSide};
use crate::models::risk::{ExitRequest, RiskLevels};
use crate::models::signal::{SignalAction, SignalState};
use crate::models::strategy::{MarketMakingConfig, StrategyConfig, StrategyMode};
use crate::quotes::{
    adjust_for_inventory, QuoteEngine, RefreshDecision, RefreshReason, RefreshScheduler,
    SkewBlender,
};
use crate::services::execution::{ExecutionGateway, SignalReport, SignalSink};
use crate::services::market_data::MarketDataProvider;
use crate::signals::decision::check_exit;
use crate::signals::engine::{Evaluation, SignalEngine};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Collaborators shared by every asset worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub provider: Arc<dyn MarketDataProvider>,
    pub gateway: Arc<dyn ExecutionGateway>,
    pub sink: Arc<dyn SignalSink>,
    pub metrics: Option<Arc<Metrics>>,
    pub pool: Option<AllocationPool>,
}

impl WorkerContext {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        gateway: Arc<dyn ExecutionGateway>,
        sink: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            provider,
            gateway,
            sink,
            metrics: None,
            pool: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_pool(mut self, pool: AllocationPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Backoff,
    DataUnavailable,
    InsufficientHistory,
    InvalidData,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backoff => "backoff",
            Self::DataUnavailable => "data_unavailable",
            Self::InsufficientHistory => "insufficient_history",
            Self::InvalidData => "invalid_data",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SignalTick {
    Skipped(SkipReason),
    Evaluated(Box<Evaluation>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteTick {
    Disabled,
    Skipped(SkipReason),
    Kept,
    Replaced(RefreshReason),
}

/// Protective levels for the position opened on the last directional signal.
#[derive(Debug, Clone, Copy)]
struct OpenRisk {
    levels: RiskLevels,
    seen_open: bool,
    exit_requested: bool,
}

struct QuotePipeline {
    engine: QuoteEngine,
    skew: Option<SkewBlender>,
    max_position_usd: f64,
    refresh: RefreshScheduler,
}

impl QuotePipeline {
    fn new(config: &MarketMakingConfig) -> Self {
        Self {
            engine: QuoteEngine::from_config(config),
            skew: config
                .skew_enabled
                .then(|| SkewBlender::new(config.skew_factor)),
            max_position_usd: config.max_position_usd,
            refresh: RefreshScheduler::from_config(config),
        }
    }
}

pub struct AssetWorker {
    asset: String,
    interval: String,
    history_bars: usize,
    mode: StrategyMode,
    engine: SignalEngine,
    quotes: Option<QuotePipeline>,
    backoff: FetchBackoff,
    /// Mid-price outages back off quote ticks only.
    quote_backoff: FetchBackoff,
    open_risk: Option<OpenRisk>,
    ctx: WorkerContext,
}

impl AssetWorker {
    /// Fails with `InvalidRiskParameter`/`InvalidConfig`; such an asset must
    /// not be started.
    pub fn new(
        asset: &str,
        interval: &str,
        history_bars: usize,
        strategy: StrategyConfig,
        market_making: &MarketMakingConfig,
        ctx: WorkerContext,
    ) -> Result<Self, EngineError> {
        let mode = strategy.mode;
        let engine = SignalEngine::new(strategy)?;
        let quotes = if market_making.enabled {
            market_making.validate()?;
            Some(QuotePipeline::new(market_making))
        } else {
            None
        };
        Ok(Self {
            asset: asset.to_string(),
            interval: interval.to_string(),
            history_bars: history_bars.max(engine.required_bars()),
            mode,
            engine,
            quotes,
            backoff: FetchBackoff::default(),
            quote_backoff: FetchBackoff::default(),
            open_risk: None,
            ctx,
        })
    }

    pub fn with_backoff(mut self, backoff: FetchBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_quote_backoff(mut self, backoff: FetchBackoff) -> Self {
        self.quote_backoff = backoff;
        self
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn backoff(&self) -> &FetchBackoff {
        &self.backoff
    }

    pub fn quote_backoff(&self) -> &FetchBackoff {
        &self.quote_backoff
    }

    pub fn open_levels(&self) -> Option<RiskLevels> {
        self.open_risk.map(|risk| risk.levels)
    }

    pub fn live_quotes(&self) -> Option<&QuoteSet> {
        self.quotes.as_ref().and_then(|q| q.refresh.live())
    }

    pub fn needs_resync(&self) -> bool {
        self.quotes
            .as_ref()
            .is_some_and(|q| q.refresh.needs_resync())
    }

    pub fn market_making_enabled(&self) -> bool {
        self.quotes.is_some()
    }

    /// Bias for quote skew: the last emitted directional signal.
    pub fn bias(&self) -> SignalAction {
        match self.engine.detector().state() {
            SignalState::Long => SignalAction::Buy,
            SignalState::Short => SignalAction::Sell,
            SignalState::Flat => SignalAction::Hold,
        }
    }

    fn skip(&self, reason: SkipReason) {
        if let Some(metrics) = &self.ctx.metrics {
            metrics
                .signal_ticks_skipped_total
                .with_label_values(&[reason.as_str()])
                .inc();
        }
    }

    /// Fetch, evaluate, and report one signal tick. Data faults skip the tick
    /// without touching detector state.
    pub async fn run_signal_tick(&mut self) -> Result<SignalTick, EngineError> {
        let started = Instant::now();
        let outcome = self.signal_tick().await;
        if let Some(metrics) = &self.ctx.metrics {
            metrics
                .tick_duration_seconds
                .observe(started.elapsed().as_secs_f64());
        }
        if let Ok(SignalTick::Skipped(reason)) = &outcome {
            self.skip(*reason);
        }
        outcome
    }

    async fn signal_tick(&mut self) -> Result<SignalTick, EngineError> {
        if self.backoff.is_waiting(tokio::time::Instant::now()) {
            debug!(asset = %self.asset, "AssetWorker: {} still backing off", self.asset);
            return Ok(SignalTick::Skipped(SkipReason::Backoff));
        }

        let bars = match self
            .ctx
            .provider
            .fetch_price_history(&self.asset, &self.interval, self.history_bars)
            .await
        {
            Ok(bars) => bars,
            Err(e @ EngineError::DataUnavailable { .. }) => {
                let reason = fetch_failed(&self.asset, &mut self.backoff, "price history", &e);
                return Ok(SignalTick::Skipped(reason));
            }
            Err(e) => return Err(e),
        };
        self.backoff.reset();

        let window = match PriceWindow::new(bars) {
            Ok(window) => window,
            Err(e) => {
                warn!(asset = %self.asset, error = %e, "AssetWorker: rejected price window for {}", self.asset);
                return Ok(SignalTick::Skipped(SkipReason::InvalidData));
            }
        };

        let evaluation = match self.engine.evaluate(&self.asset, &window) {
            Ok(evaluation) => evaluation,
            Err(e) if e.is_insufficient_history() => {
                debug!(asset = %self.asset, error = %e, "AssetWorker: {} waiting for more bars", self.asset);
                return Ok(SignalTick::Skipped(SkipReason::InsufficientHistory));
            }
            Err(e) => return Err(e),
        };
        if let Some(metrics) = &self.ctx.metrics {
            metrics.signal_ticks_total.inc();
        }

        self.monitor_exit(&evaluation).await;

        if evaluation.signal.is_directional() {
            self.report_directional(&evaluation).await;
        }

        if self.mode == StrategyMode::Hybrid {
            let summary = self.engine.context_summary(&evaluation);
            if let Err(e) = self.ctx.sink.report_context_summary(&summary).await {
                warn!(asset = %self.asset, error = %e, "AssetWorker: context summary not delivered for {}", self.asset);
            }
        }

        Ok(SignalTick::Evaluated(Box::new(evaluation)))
    }

    async fn monitor_exit(&mut self, evaluation: &Evaluation) {
        let Some(mut risk) = self.open_risk else {
            return;
        };

        match self.ctx.gateway.position_open(&self.asset).await {
            Ok(true) => risk.seen_open = true,
            Ok(false) if risk.seen_open => {
                info!(asset = %self.asset, "AssetWorker: position closed for {}, dropping risk levels", self.asset);
                self.open_risk = None;
                if let Some(pool) = &self.ctx.pool {
                    pool.release(&self.asset).await;
                }
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(asset = %self.asset, error = %e, "AssetWorker: position query failed for {}", self.asset);
            }
        }

        if !risk.exit_requested {
            if let Some(reason) = check_exit(&risk.levels, &evaluation.signal) {
                let request = ExitRequest {
                    asset: self.asset.clone(),
                    reason,
                    price: evaluation.signal.price,
                    levels: risk.levels,
                    timestamp: evaluation.signal.timestamp,
                };
                info!(
                    asset = %self.asset,
                    reason = reason.as_str(),
                    price = request.price,
                    "AssetWorker: exit requested for {}",
                    self.asset
                );
                match self.ctx.sink.report_exit(&request).await {
                    Ok(()) => {
                        risk.exit_requested = true;
                        if let Some(metrics) = &self.ctx.metrics {
                            metrics
                                .exit_requests_total
                                .with_label_values(&[reason.as_str()])
                                .inc();
                        }
                    }
                    Err(e) => {
                        warn!(asset = %self.asset, error = %e, "AssetWorker: exit request not delivered for {}", self.asset);
                    }
                }
            }
        }
        self.open_risk = Some(risk);
    }

    async fn report_directional(&mut self, evaluation: &Evaluation) {
        let signal = &evaluation.signal;
        if let Some(levels) = evaluation.risk {
            self.open_risk = Some(OpenRisk {
                levels,
                seen_open: false,
                exit_requested: false,
            });
        }

        let allocation_usd = match &self.ctx.pool {
            Some(pool) => pool.rebalance(&self.asset, signal.action).await,
            None => None,
        };

        info!(
            asset = %self.asset,
            action = %signal.action,
            price = signal.price,
            buy_count = signal.buy_count,
            sell_count = signal.sell_count,
            "AssetWorker: {} signal for {} at {:.2}",
            signal.action,
            self.asset,
            signal.price
        );
        if let Some(metrics) = &self.ctx.metrics {
            metrics
                .signals_emitted_total
                .with_label_values(&[signal.action.as_str()])
                .inc();
        }

        let report = SignalReport {
            asset: self.asset.clone(),
            signal: signal.clone(),
            risk: evaluation.risk,
            allocation_usd,
        };
        if let Err(e) = self.ctx.sink.report_signal(&report).await {
            warn!(asset = %self.asset, error = %e, "AssetWorker: signal report not delivered for {}", self.asset);
        }
    }

    /// Replace the live quote set when stale, otherwise leave it untouched.
    pub async fn run_quote_tick(&mut self, now: DateTime<Utc>) -> Result<QuoteTick, EngineError> {
        if self.quotes.is_none() {
            return Ok(QuoteTick::Disabled);
        }
        if self.quote_backoff.is_waiting(tokio::time::Instant::now()) {
            return Ok(QuoteTick::Skipped(SkipReason::Backoff));
        }

        let mid_price = match self.ctx.provider.get_mid_price(&self.asset).await {
            Ok(mid) if mid.is_finite() && mid > 0.0 => mid,
            Ok(mid) => {
                warn!(asset = %self.asset, mid_price = mid, "AssetWorker: ignoring invalid mid price for {}", self.asset);
                return Ok(QuoteTick::Skipped(SkipReason::InvalidData));
            }
            Err(e @ EngineError::DataUnavailable { .. }) => {
                let reason = fetch_failed(&self.asset, &mut self.quote_backoff, "mid price", &e);
                return Ok(QuoteTick::Skipped(reason));
            }
            Err(e) => return Err(e),
        };
        self.quote_backoff.reset();

        let decision = match &self.quotes {
            Some(pipeline) => pipeline.refresh.evaluate(now, mid_price),
            None => return Ok(QuoteTick::Disabled),
        };
        let reason = match decision {
            RefreshDecision::Keep => {
                debug!(asset = %self.asset, mid_price = mid_price, "AssetWorker: keeping live quotes for {}", self.asset);
                return Ok(QuoteTick::Kept);
            }
            RefreshDecision::Replace(reason) => reason,
        };

        let bias = self.bias();
        let position_usd = self.position_for_sizing().await;
        let asset = self.asset.clone();
        let gateway = self.ctx.gateway.clone();
        let metrics = self.ctx.metrics.clone();
        let Some(pipeline) = self.quotes.as_mut() else {
            return Ok(QuoteTick::Disabled);
        };

        let stale = if reason == RefreshReason::Resync {
            match gateway.open_quote_levels(&asset).await {
                Ok(open) => orphaned_set(&asset, &open, pipeline.refresh.live(), now),
                Err(e) => {
                    pipeline.refresh.mark_failed();
                    return Err(EngineError::stale_quotes(
                        &asset,
                        format!("re-query of open levels failed: {}", e),
                    ));
                }
            }
        } else {
            pipeline.refresh.live().cloned()
        };

        let mut next = pipeline.engine.build(&asset, mid_price, now);
        if let Some(skew) = &pipeline.skew {
            next = skew.apply(&next, bias, &pipeline.engine);
        }
        if let Some(position_usd) = position_usd {
            next = adjust_for_inventory(&next, position_usd, pipeline.max_position_usd);
        }

        if let Some(stale) = stale.filter(|set| set.level_count() > 0) {
            if let Err(e) = gateway.cancel_quote_set(&asset, &stale).await {
                return Err(refresh_failed(pipeline, metrics.as_deref(), &asset, "cancel", e));
            }
        }
        if let Err(e) = gateway.publish_quote_set(&asset, &next).await {
            return Err(refresh_failed(pipeline, metrics.as_deref(), &asset, "publish", e));
        }

        info!(
            asset = %asset,
            reason = %reason,
            mid_price = mid_price,
            bias = %next.bias,
            "AssetWorker: replaced quotes for {} ({})",
            asset,
            reason
        );
        if let Some(metrics) = &metrics {
            metrics
                .quote_refreshes_total
                .with_label_values(&[reason.as_str()])
                .inc();
        }
        pipeline.refresh.mark_published(next, now);
        Ok(QuoteTick::Replaced(reason))
    }

    async fn position_for_sizing(&self) -> Option<f64> {
        let pipeline = self.quotes.as_ref()?;
        if pipeline.max_position_usd <= 0.0 {
            return None;
        }
        match self.ctx.gateway.position_usd(&self.asset).await {
            Ok(position) if position != 0.0 => Some(position),
            Ok(_) => None,
            Err(e) => {
                warn!(asset = %self.asset, error = %e, "AssetWorker: position query failed for {}, quoting without inventory adjustment", self.asset);
                None
            }
        }
    }
}

/// Arm `backoff` after a failed fetch of `what`.
fn fetch_failed(
    asset: &str,
    backoff: &mut FetchBackoff,
    what: &str,
    error: &EngineError,
) -> SkipReason {
    let delay = backoff.record_failure(tokio::time::Instant::now());
    warn!(
        asset = %asset,
        error = %error,
        failures = backoff.failures(),
        retry_in_ms = delay.as_millis() as u64,
        "AssetWorker: {} unavailable for {}, backing off",
        what,
        asset
    );
    SkipReason::DataUnavailable
}

/// Set covering the levels the venue still reports open after a failure.
fn orphaned_set(
    asset: &str,
    open: &[QuoteLevel],
    live: Option<&QuoteSet>,
    now: DateTime<Utc>,
) -> Option<QuoteSet> {
    if open.is_empty() {
        return None;
    }
    let (bids, asks): (Vec<QuoteLevel>, Vec<QuoteLevel>) = open
        .iter()
        .copied()
        .partition(|level| level.side == QuoteSide::Bid);
    Some(QuoteSet {
        asset: asset.to_string(),
        mid_price: live.map(|set| set.mid_price).unwrap_or_default(),
        bids,
        asks,
        bias: live.map(|set| set.bias).unwrap_or(SignalAction::Hold),
        created_at: live.map(|set| set.created_at).unwrap_or(now),
        rationale: "orphaned levels".to_string(),
    })
}

fn refresh_failed(
    pipeline: &mut QuotePipeline,
    metrics: Option<&Metrics>,
    asset: &str,
    step: &str,
    cause: EngineError,
) -> EngineError {
    pipeline.refresh.mark_failed();
    if let Some(metrics) = metrics {
        metrics.quote_refresh_failures_total.inc();
    }
    error!(
        asset = %asset,
        step = step,
        error = %cause,
        "AssetWorker: quote {} failed for {}, live orders will be re-queried",
        step,
        asset
    );
    EngineError::stale_quotes(asset, format!("{} failed: {}", step, cause))
}
