//! Task-per-asset runtime with drop-on-overrun ticks and graceful shutdown.

use crate::config::AppConfig;
use crate::core::allocation::AllocationPool;
use crate::core::scheduler::{TickSchedule, TickSource};
use crate::core::worker::{AssetWorker, WorkerContext};
use crate::error::EngineError;
use crate::models::strategy::{MarketMakingConfig, StrategyConfig};
use chrono::Utc;
use futures_util::future::join_all;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// Configuration for the asset runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub assets: Vec<String>,
    pub interval: String,
    pub history_bars: usize,
    pub strategy: StrategyConfig,
    pub market_making: MarketMakingConfig,
    pub capital_pool_usd: f64,
}

impl From<&AppConfig> for RuntimeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            assets: config.assets.clone(),
            interval: config.interval.clone(),
            history_bars: config.history_bars,
            strategy: config.strategy.clone(),
            market_making: config.market_making.clone(),
            capital_pool_usd: config.capital_pool_usd,
        }
    }
}

pub struct SignalRuntime {
    config: RuntimeConfig,
    ctx: WorkerContext,
    signal_ticks: TickSource,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl SignalRuntime {
    pub fn new(config: RuntimeConfig, ctx: WorkerContext) -> Result<Self, EngineError> {
        let signal_ticks = TickSource::Cron(TickSchedule::new(&config.interval)?);
        let ctx = if ctx.pool.is_none() && config.capital_pool_usd > 0.0 {
            ctx.with_pool(AllocationPool::new(config.capital_pool_usd))
        } else {
            ctx
        };
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            ctx,
            signal_ticks,
            shutdown_tx,
            handles: Vec::new(),
        })
    }

    /// Replace the candle-aligned signal clock.
    pub fn with_signal_ticks(mut self, source: TickSource) -> Self {
        self.signal_ticks = source;
        self
    }

    /// Spawn one task per asset. Assets whose configuration is rejected are
    /// not started; fails only when no asset could start.
    pub fn start(&mut self) -> Result<usize, EngineError> {
        let refresh = self
            .config
            .market_making
            .enabled
            .then(|| Duration::from_secs(self.config.market_making.refresh_interval_sec));
        let mut last_error = None;

        for asset in &self.config.assets {
            let worker = match AssetWorker::new(
                asset,
                &self.config.interval,
                self.config.history_bars,
                self.config.strategy.clone(),
                &self.config.market_making,
                self.ctx.clone(),
            ) {
                Ok(worker) => worker,
                Err(e) => {
                    error!(asset = %asset, error = %e, "SignalRuntime: not starting {}", asset);
                    last_error = Some(e);
                    continue;
                }
            };
            let handle = tokio::spawn(run_asset(
                worker,
                self.signal_ticks.clone(),
                refresh,
                self.shutdown_tx.subscribe(),
            ));
            self.handles.push((asset.clone(), handle));
        }

        if self.handles.is_empty() {
            return Err(last_error.unwrap_or_else(|| {
                EngineError::InvalidConfig("no assets configured".to_string())
            }));
        }
        info!(
            assets = self.handles.len(),
            interval = %self.config.interval,
            market_making = self.config.market_making.enabled,
            "SignalRuntime: started {} asset tasks",
            self.handles.len()
        );
        Ok(self.handles.len())
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|(_, handle)| !handle.is_finished())
    }

    /// Stop admitting ticks and wait for in-flight ticks to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let (assets, handles): (Vec<String>, Vec<JoinHandle<()>>) =
            self.handles.into_iter().unzip();
        for (asset, result) in assets.iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                warn!(asset = %asset, error = %e, "SignalRuntime: task for {} ended abnormally", asset);
            }
        }
        info!("SignalRuntime: stopped");
    }
}

async fn next_refresh(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn run_asset(
    mut worker: AssetWorker,
    signal_ticks: TickSource,
    refresh: Option<Duration>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut refresh_timer = refresh.map(|period| {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer
    });
    let mut next_signal = Instant::now();
    info!(asset = %worker.asset(), "SignalRuntime: task for {} started", worker.asset());

    loop {
        // Handlers run to completion inside the branch, so a tick that comes
        // due meanwhile is dropped rather than queued.
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep_until(next_signal) => {
                match worker.run_signal_tick().await {
                    Ok(_) => {}
                    Err(e) if e.is_recoverable() => {
                        warn!(asset = %worker.asset(), error = %e, "SignalRuntime: signal tick failed for {}", worker.asset());
                    }
                    Err(e) => {
                        error!(asset = %worker.asset(), error = %e, "SignalRuntime: stopping {} after fatal error", worker.asset());
                        break;
                    }
                }
                next_signal = Instant::now() + signal_ticks.delay_from(Utc::now());
            }
            _ = next_refresh(&mut refresh_timer) => {
                if let Err(e) = worker.run_quote_tick(Utc::now()).await {
                    warn!(asset = %worker.asset(), error = %e, "SignalRuntime: quote tick failed for {}", worker.asset());
                }
            }
        }
    }
    info!(asset = %worker.asset(), "SignalRuntime: task for {} stopped", worker.asset());
}
