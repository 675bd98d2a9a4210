//! Single-asset worker: signal ticks, exits, backoff and quote refreshes.

use crate::support::{
    approx_eq, bars_from_closes, base_time, rise_then_fall, GatewayCall, MockGateway,
    RecordingSink, ScriptedProvider,
};
use chrono::Duration;
use quotrix::core::{AllocationPool, AssetWorker, FetchBackoff, QuoteTick, SignalTick, SkipReason, WorkerContext};
use quotrix::metrics::Metrics;
use quotrix::models::risk::ExitReason;
use quotrix::models::signal::{SignalAction, SignalState};
use quotrix::models::strategy::{MarketMakingConfig, StrategyConfig, StrategyMode};
use quotrix::quotes::RefreshReason;
use quotrix::EngineError;
use std::sync::Arc;

struct Harness {
    provider: Arc<ScriptedProvider>,
    gateway: Arc<MockGateway>,
    sink: Arc<RecordingSink>,
}

impl Harness {
    fn new(closes: &[f64], served: usize) -> Self {
        Self {
            provider: Arc::new(ScriptedProvider::new(bars_from_closes(closes), served)),
            gateway: Arc::new(MockGateway::default()),
            sink: Arc::new(RecordingSink::default()),
        }
    }

    fn context(&self) -> WorkerContext {
        WorkerContext::new(self.provider.clone(), self.gateway.clone(), self.sink.clone())
    }

    fn worker(&self, strategy: StrategyConfig, mm: &MarketMakingConfig) -> AssetWorker {
        AssetWorker::new("BTC", "5m", 300, strategy, mm, self.context()).unwrap()
    }
}

fn market_making() -> MarketMakingConfig {
    MarketMakingConfig {
        enabled: true,
        ..MarketMakingConfig::default()
    }
}

async fn run_signal_ticks(worker: &mut AssetWorker, ticks: usize) -> Vec<SignalTick> {
    let mut outcomes = Vec::with_capacity(ticks);
    for _ in 0..ticks {
        outcomes.push(worker.run_signal_tick().await.unwrap());
    }
    outcomes
}

#[tokio::test]
async fn test_short_history_skips_without_touching_state() {
    let harness = Harness::new(&vec![100.0; 120], 50);
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut worker = AssetWorker::new(
        "BTC",
        "5m",
        300,
        StrategyConfig::default(),
        &MarketMakingConfig::default(),
        harness.context().with_metrics(metrics.clone()),
    )
    .unwrap();

    for outcome in run_signal_ticks(&mut worker, 3).await {
        assert!(matches!(
            outcome,
            SignalTick::Skipped(SkipReason::InsufficientHistory)
        ));
    }
    assert_eq!(worker.engine().detector().counts(), (0, 0));
    assert_eq!(worker.engine().detector().state(), SignalState::Flat);
    assert!(harness.sink.signals.lock().unwrap().is_empty());
    assert_eq!(
        metrics
            .signal_ticks_skipped_total
            .with_label_values(&["insufficient_history"])
            .get(),
        3
    );
    assert_eq!(metrics.signal_ticks_total.get(), 0);
}

#[tokio::test]
async fn test_trend_reversal_reports_signals_and_exits() {
    let harness = Harness::new(&rise_then_fall(), 200);
    let pool = AllocationPool::new(1000.0);
    let mut worker = AssetWorker::new(
        "BTC",
        "5m",
        300,
        StrategyConfig::default(),
        &MarketMakingConfig::default(),
        harness.context().with_pool(pool.clone()),
    )
    .unwrap();

    let outcomes = run_signal_ticks(&mut worker, 60).await;
    assert!(outcomes
        .iter()
        .all(|outcome| matches!(outcome, SignalTick::Evaluated(_))));

    let signals = harness.sink.signals.lock().unwrap().clone();
    let actions: Vec<SignalAction> = signals.iter().map(|r| r.signal.action).collect();
    assert_eq!(actions, vec![SignalAction::Buy, SignalAction::Sell]);
    assert_eq!(signals[0].signal.price, 101.0);
    assert_eq!(signals[1].signal.price, 101.0);
    assert_eq!(signals[0].allocation_usd, Some(1000.0));

    let long = signals[0].risk.unwrap();
    assert!(approx_eq(long.stop_loss.unwrap(), 93.93));
    assert!(approx_eq(long.take_profit, 115.14));
    let short = signals[1].risk.unwrap();
    assert!(approx_eq(short.stop_loss.unwrap(), 108.07));
    assert!(approx_eq(short.take_profit, 86.86));

    let exits = harness.sink.exits.lock().unwrap().clone();
    let reasons: Vec<ExitReason> = exits.iter().map(|e| e.reason).collect();
    assert_eq!(
        reasons,
        vec![ExitReason::TakeProfitHit, ExitReason::TakeProfitHit]
    );
    assert_eq!(exits[0].price, 116.0);
    assert_eq!(exits[1].price, 86.0);
    assert_eq!(worker.bias(), SignalAction::Sell);
}

#[tokio::test]
async fn test_closed_position_drops_levels_and_allocation() {
    let harness = Harness::new(&rise_then_fall(), 200);
    let pool = AllocationPool::new(500.0);
    let mut worker = AssetWorker::new(
        "BTC",
        "5m",
        300,
        StrategyConfig::default(),
        &MarketMakingConfig::default(),
        harness.context().with_pool(pool.clone()),
    )
    .unwrap();

    run_signal_ticks(&mut worker, 6).await;
    assert!(worker.open_levels().is_some());
    assert_eq!(pool.allocation("BTC").await, Some(500.0));

    harness.gateway.set_position_open(true);
    run_signal_ticks(&mut worker, 1).await;
    assert!(worker.open_levels().is_some());

    harness.gateway.set_position_open(false);
    run_signal_ticks(&mut worker, 1).await;
    assert!(worker.open_levels().is_none());
    assert_eq!(pool.allocation("BTC").await, None);
    assert!(harness.sink.exits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_hybrid_mode_publishes_context_summaries() {
    let harness = Harness::new(&rise_then_fall(), 200);
    let strategy = StrategyConfig {
        mode: StrategyMode::Hybrid,
        ..StrategyConfig::default()
    };
    let mut worker = harness.worker(strategy, &MarketMakingConfig::default());

    run_signal_ticks(&mut worker, 10).await;

    let summaries = harness.sink.summaries.lock().unwrap().clone();
    assert_eq!(summaries.len(), 10);
    assert_eq!(summaries[5].action, SignalAction::Buy);
    assert!(summaries[5]
        .text
        .starts_with("=== Trader XO Strategy Indicators for BTC ==="));
    assert!(summaries[5].risk.is_some());
    assert!(summaries[4].risk.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_backs_off_then_recovers() {
    let harness = Harness::new(&vec![100.0; 260], 220);
    let mut worker = harness
        .worker(StrategyConfig::default(), &MarketMakingConfig::default())
        .with_backoff(FetchBackoff::new(
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(60),
            false,
        ));
    harness.provider.fail_next(1);

    let first = worker.run_signal_tick().await.unwrap();
    assert!(matches!(first, SignalTick::Skipped(SkipReason::DataUnavailable)));
    assert_eq!(worker.backoff().failures(), 1);

    let second = worker.run_signal_tick().await.unwrap();
    assert!(matches!(second, SignalTick::Skipped(SkipReason::Backoff)));
    assert_eq!(harness.provider.fetches(), 1);

    tokio::time::advance(std::time::Duration::from_secs(1)).await;
    let third = worker.run_signal_tick().await.unwrap();
    assert!(matches!(third, SignalTick::Evaluated(_)));
    assert_eq!(harness.provider.fetches(), 2);
    assert_eq!(worker.backoff().failures(), 0);
}

#[tokio::test]
async fn test_quote_ticks_disabled_without_market_making() {
    let harness = Harness::new(&vec![100.0; 10], 5);
    let mut worker = harness.worker(StrategyConfig::default(), &MarketMakingConfig::default());
    assert_eq!(worker.run_quote_tick(base_time()).await.unwrap(), QuoteTick::Disabled);
    assert!(harness.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_quote_refresh_lifecycle() {
    let harness = Harness::new(&vec![100.0; 10], 5);
    harness.provider.set_mid(1000.0);
    let mut worker = harness.worker(StrategyConfig::default(), &market_making());
    let t0 = base_time();

    let first = worker.run_quote_tick(t0).await.unwrap();
    assert_eq!(first, QuoteTick::Replaced(RefreshReason::Initial));
    let calls = harness.gateway.calls();
    assert_eq!(calls.len(), 1);
    let GatewayCall::Publish(set) = &calls[0] else {
        panic!("expected publish, got {:?}", calls[0]);
    };
    assert_eq!(set.level_count(), 6);
    assert!(approx_eq(set.bids[0].price, 999.0));
    assert!(approx_eq(set.asks[2].price, 1002.0));
    assert!(set.levels().all(|l| l.size_usd == 100.0));

    // Unchanged mid inside the interval: no gateway traffic.
    harness.gateway.clear_calls();
    for seconds in [1, 10, 29] {
        assert_eq!(
            worker.run_quote_tick(t0 + Duration::seconds(seconds)).await.unwrap(),
            QuoteTick::Kept
        );
    }
    assert!(harness.gateway.calls().is_empty());

    let elapsed = worker.run_quote_tick(t0 + Duration::seconds(30)).await.unwrap();
    assert_eq!(elapsed, QuoteTick::Replaced(RefreshReason::IntervalElapsed));
    let calls = harness.gateway.calls();
    assert_eq!(calls[0], GatewayCall::Cancel(6));
    assert!(matches!(calls[1], GatewayCall::Publish(_)));

    harness.provider.set_mid(1002.0);
    let moved = worker.run_quote_tick(t0 + Duration::seconds(31)).await.unwrap();
    assert_eq!(moved, QuoteTick::Replaced(RefreshReason::MidPriceMoved));
    assert_eq!(worker.live_quotes().unwrap().mid_price, 1002.0);
    assert_eq!(harness.gateway.open_level_count(), 6);
}

#[tokio::test]
async fn test_failed_publish_forces_resync() {
    let harness = Harness::new(&vec![100.0; 10], 5);
    harness.provider.set_mid(1000.0);
    let mut worker = harness.worker(StrategyConfig::default(), &market_making());
    let t0 = base_time();
    worker.run_quote_tick(t0).await.unwrap();

    harness.gateway.fail_next_publish();
    let err = worker
        .run_quote_tick(t0 + Duration::seconds(30))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StaleQuoteRaceCondition { .. }));
    assert!(worker.needs_resync());

    harness.gateway.clear_calls();
    let resync = worker.run_quote_tick(t0 + Duration::seconds(31)).await.unwrap();
    assert_eq!(resync, QuoteTick::Replaced(RefreshReason::Resync));
    let calls = harness.gateway.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], GatewayCall::OpenLevels);
    assert!(matches!(calls[1], GatewayCall::Publish(_)));
    assert!(!worker.needs_resync());
}

#[tokio::test]
async fn test_failed_cancel_cleans_orphaned_levels() {
    let harness = Harness::new(&vec![100.0; 10], 5);
    harness.provider.set_mid(1000.0);
    let mut worker = harness.worker(StrategyConfig::default(), &market_making());
    let t0 = base_time();
    worker.run_quote_tick(t0).await.unwrap();

    harness.gateway.fail_next_cancel();
    harness.gateway.clear_calls();
    let err = worker
        .run_quote_tick(t0 + Duration::seconds(30))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StaleQuoteRaceCondition { .. }));
    assert_eq!(harness.gateway.calls(), vec![GatewayCall::Cancel(6)]);

    harness.gateway.clear_calls();
    let resync = worker.run_quote_tick(t0 + Duration::seconds(31)).await.unwrap();
    assert_eq!(resync, QuoteTick::Replaced(RefreshReason::Resync));
    let calls = harness.gateway.calls();
    assert_eq!(calls[0], GatewayCall::OpenLevels);
    assert_eq!(calls[1], GatewayCall::Cancel(6));
    assert!(matches!(calls[2], GatewayCall::Publish(_)));
    assert_eq!(harness.gateway.open_level_count(), 6);
}

#[tokio::test]
async fn test_buy_signal_skews_quotes_toward_bids() {
    let harness = Harness::new(&rise_then_fall(), 200);
    harness.provider.set_mid(1000.0);
    let mut worker = harness.worker(StrategyConfig::default(), &market_making());

    run_signal_ticks(&mut worker, 6).await;
    assert_eq!(worker.bias(), SignalAction::Buy);

    worker.run_quote_tick(base_time()).await.unwrap();
    let set = worker.live_quotes().unwrap();
    assert_eq!(set.bias, SignalAction::Buy);
    assert!(set.bids.iter().all(|l| approx_eq(l.size_usd, 130.0)));
    assert!(set.asks.iter().all(|l| approx_eq(l.size_usd, 70.0)));
}

#[tokio::test]
async fn test_inventory_leans_quotes_against_position() {
    let harness = Harness::new(&vec![100.0; 10], 5);
    harness.provider.set_mid(1000.0);
    harness.gateway.set_position_usd(600.0);
    let mm = MarketMakingConfig {
        skew_enabled: false,
        max_position_usd: 1000.0,
        ..market_making()
    };
    let mut worker = harness.worker(StrategyConfig::default(), &mm);

    worker.run_quote_tick(base_time()).await.unwrap();
    let set = worker.live_quotes().unwrap();
    assert!(set.bids.iter().all(|l| approx_eq(l.size_usd, 50.0)));
    assert!(set.asks.iter().all(|l| approx_eq(l.size_usd, 150.0)));
}

#[tokio::test]
async fn test_kept_quotes_skip_position_query() {
    let harness = Harness::new(&vec![100.0; 10], 5);
    harness.provider.set_mid(1000.0);
    harness.gateway.set_position_usd(100.0);
    let mm = MarketMakingConfig {
        max_position_usd: 1000.0,
        ..market_making()
    };
    let mut worker = harness.worker(StrategyConfig::default(), &mm);
    let t0 = base_time();

    worker.run_quote_tick(t0).await.unwrap();
    assert_eq!(harness.gateway.position_queries(), 1);

    for seconds in [1, 5, 20] {
        assert_eq!(
            worker.run_quote_tick(t0 + Duration::seconds(seconds)).await.unwrap(),
            QuoteTick::Kept
        );
    }
    assert_eq!(harness.gateway.position_queries(), 1);

    worker.run_quote_tick(t0 + Duration::seconds(30)).await.unwrap();
    assert_eq!(harness.gateway.position_queries(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_mid_price_outage_does_not_delay_signals() {
    let harness = Harness::new(&vec![100.0; 260], 220);
    let mut worker = harness
        .worker(StrategyConfig::default(), &market_making())
        .with_quote_backoff(FetchBackoff::new(
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(60),
            false,
        ));
    harness.provider.fail_next_mid(1);

    let quote = worker.run_quote_tick(base_time()).await.unwrap();
    assert_eq!(quote, QuoteTick::Skipped(SkipReason::DataUnavailable));
    assert_eq!(worker.quote_backoff().failures(), 1);
    assert_eq!(worker.backoff().failures(), 0);

    let signal = worker.run_signal_tick().await.unwrap();
    assert!(matches!(signal, SignalTick::Evaluated(_)));

    assert_eq!(
        worker.run_quote_tick(base_time()).await.unwrap(),
        QuoteTick::Skipped(SkipReason::Backoff)
    );
    tokio::time::advance(std::time::Duration::from_secs(1)).await;
    assert_eq!(
        worker.run_quote_tick(base_time()).await.unwrap(),
        QuoteTick::Replaced(RefreshReason::Initial)
    );
    assert_eq!(worker.quote_backoff().failures(), 0);
}
