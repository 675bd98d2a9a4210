//! Quotrix Worker
//!
//! Runs one task per configured asset: signal ticks on candle closes and,
//! when market making is enabled, quote refresh ticks.

use dotenvy::dotenv;
use quotrix::config::AppConfig;
use quotrix::core::runtime::{RuntimeConfig, SignalRuntime};
use quotrix::core::worker::WorkerContext;
use quotrix::logging;
use quotrix::metrics::Metrics;
use quotrix::services::{LogSignalSink, PaperGateway, ReplayMarketData};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env()?;
    info!("Starting Quotrix Worker");
    info!(environment = %config.environment, "Environment");
    info!(
        assets = ?config.assets,
        interval = %config.interval,
        mode = ?config.strategy.mode,
        market_making = config.market_making.enabled,
        "Assets: {} on {}",
        config.assets.join(", "),
        config.interval
    );

    let path = config
        .price_history_path
        .clone()
        .ok_or("PRICE_HISTORY_PATH must point at a recorded price history")?;
    let provider = Arc::new(ReplayMarketData::from_file(&path, config.history_bars)?);

    let metrics = Arc::new(Metrics::new()?);
    let ctx = WorkerContext::new(provider, Arc::new(PaperGateway::new()), Arc::new(LogSignalSink))
        .with_metrics(metrics.clone());

    let mut runtime = SignalRuntime::new(RuntimeConfig::from(&config), ctx)?;
    runtime.start()?;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    runtime.shutdown().await;

    debug!("Final metrics:\n{}", metrics.export()?);
    info!("Worker stopped");
    Ok(())
}
