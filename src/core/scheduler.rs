//! Candle-aligned tick schedule.

use crate::config::SUPPORTED_INTERVALS;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Cron expression (with seconds) firing at every close of `interval`.
pub fn cron_expression(interval: &str) -> Result<&'static str, EngineError> {
    let expr = match interval {
        "1m" => "0 * * * * *",
        "5m" => "0 */5 * * * *",
        "15m" => "0 */15 * * * *",
        "30m" => "0 */30 * * * *",
        "1h" => "0 0 * * * *",
        "2h" => "0 0 */2 * * *",
        "4h" => "0 0 */4 * * *",
        "6h" => "0 0 */6 * * *",
        "12h" => "0 0 */12 * * *",
        "1d" => "0 0 0 * * *",
        "1w" => "0 0 0 * * Mon",
        other => {
            return Err(EngineError::InvalidConfig(format!(
                "no schedule for interval '{}', expected one of {}",
                other,
                SUPPORTED_INTERVALS.join(" ")
            )))
        }
    };
    Ok(expr)
}

/// When signal ticks fire.
#[derive(Debug, Clone)]
pub enum TickSource {
    /// Aligned to candle closes.
    Cron(TickSchedule),
    /// Fixed period from the previous tick's completion.
    Every(Duration),
}

impl TickSource {
    /// Time to sleep from `now` until the next tick.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::Cron(schedule) => schedule.delay_from(now),
            Self::Every(period) => *period,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickSchedule {
    interval: String,
    schedule: Schedule,
}

impl TickSchedule {
    pub fn new(interval: &str) -> Result<Self, EngineError> {
        let expr = cron_expression(interval)?;
        let schedule = Schedule::from_str(expr).map_err(|e| {
            EngineError::InvalidConfig(format!("invalid cron expression '{}': {}", expr, e))
        })?;
        info!(
            interval = %interval,
            cron = %expr,
            "TickSchedule: signal ticks for {} (cron: {})",
            interval,
            expr
        );
        Ok(Self {
            interval: interval.to_string(),
            schedule,
        })
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// Boundaries already passed are dropped, never replayed.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Duration {
        match self.next_after(now) {
            Some(next) => (next - now).to_std().unwrap_or_default(),
            None => Duration::from_secs(60),
        }
    }
}
