//! Prometheus metrics for tick processing, signals and quote refreshes.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub signal_ticks_total: IntCounter,
    pub signal_ticks_skipped_total: IntCounterVec,
    pub signals_emitted_total: IntCounterVec,
    pub quote_refreshes_total: IntCounterVec,
    pub quote_refresh_failures_total: IntCounter,
    pub exit_requests_total: IntCounterVec,
    pub tick_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let signal_ticks_total =
            IntCounter::new("signal_ticks_total", "Signal evaluation ticks processed")?;
        let signal_ticks_skipped_total = IntCounterVec::new(
            Opts::new(
                "signal_ticks_skipped_total",
                "Signal ticks skipped without advancing detector state",
            ),
            &["reason"],
        )?;
        let signals_emitted_total = IntCounterVec::new(
            Opts::new("signals_emitted_total", "Directional signals emitted"),
            &["action"],
        )?;
        let quote_refreshes_total = IntCounterVec::new(
            Opts::new("quote_refreshes_total", "Quote sets replaced"),
            &["reason"],
        )?;
        let quote_refresh_failures_total = IntCounter::new(
            "quote_refresh_failures_total",
            "Cancel/publish pairs that partially failed",
        )?;
        let exit_requests_total = IntCounterVec::new(
            Opts::new("exit_requests_total", "Exit requests reported"),
            &["reason"],
        )?;
        let tick_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("tick_duration_seconds", "Time spent handling a single tick")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;

        registry.register(Box::new(signal_ticks_total.clone()))?;
        registry.register(Box::new(signal_ticks_skipped_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(quote_refreshes_total.clone()))?;
        registry.register(Box::new(quote_refresh_failures_total.clone()))?;
        registry.register(Box::new(exit_requests_total.clone()))?;
        registry.register(Box::new(tick_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            signal_ticks_total,
            signal_ticks_skipped_total,
            signals_emitted_total,
            quote_refreshes_total,
            quote_refresh_failures_total,
            exit_requests_total,
            tick_duration_seconds,
        })
    }

    /// Text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
