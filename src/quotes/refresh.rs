//! Replace-or-keep decisions for the live quote set.

use crate::common::math;
use crate::models::quote::QuoteSet;
use crate::models::strategy::MarketMakingConfig;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// Nothing is live yet.
    Initial,
    IntervalElapsed,
    MidPriceMoved,
    /// A previous cancel/publish pair partially failed.
    Resync,
}

impl RefreshReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::IntervalElapsed => "interval_elapsed",
            Self::MidPriceMoved => "mid_price_moved",
            Self::Resync => "resync",
        }
    }
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Keep,
    Replace(RefreshReason),
}

impl RefreshDecision {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Per-asset refresh state. Owned by the asset's worker.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    refresh_interval: TimeDelta,
    spread_bps: f64,
    live: Option<QuoteSet>,
    last_refresh: Option<DateTime<Utc>>,
    needs_resync: bool,
}

impl RefreshScheduler {
    pub fn new(refresh_interval_sec: u64, spread_bps: f64) -> Self {
        let refresh_interval = i64::try_from(refresh_interval_sec)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            refresh_interval,
            spread_bps,
            live: None,
            last_refresh: None,
            needs_resync: false,
        }
    }

    pub fn from_config(config: &MarketMakingConfig) -> Self {
        Self::new(config.refresh_interval_sec, config.spread_bps)
    }

    pub fn live(&self) -> Option<&QuoteSet> {
        self.live.as_ref()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// Decide whether the live set must be replaced given the current mid.
    pub fn evaluate(&self, now: DateTime<Utc>, mid_price: f64) -> RefreshDecision {
        if self.needs_resync {
            return RefreshDecision::Replace(RefreshReason::Resync);
        }
        let (Some(live), Some(last_refresh)) = (&self.live, self.last_refresh) else {
            return RefreshDecision::Replace(RefreshReason::Initial);
        };
        if now - last_refresh >= self.refresh_interval {
            return RefreshDecision::Replace(RefreshReason::IntervalElapsed);
        }
        if math::move_bps(live.mid_price, mid_price) > self.spread_bps {
            return RefreshDecision::Replace(RefreshReason::MidPriceMoved);
        }
        RefreshDecision::Keep
    }

    /// Record a fully successful cancel/publish pair.
    pub fn mark_published(&mut self, set: QuoteSet, now: DateTime<Utc>) {
        self.live = Some(set);
        self.last_refresh = Some(now);
        self.needs_resync = false;
    }

    /// Record a partial failure; the next tick must re-query live orders
    /// before trusting `live()`.
    pub fn mark_failed(&mut self) {
        self.needs_resync = true;
    }

    /// Forget the live set after the venue reported none of its levels open.
    pub fn clear_live(&mut self) {
        self.live = None;
    }
}
