//! Per-asset orchestration: workers, runtime, schedules and shared resources.

pub mod allocation;
pub mod backoff;
pub mod runtime;
pub mod scheduler;
pub mod worker;

pub use allocation::AllocationPool;
pub use backoff::FetchBackoff;
pub use runtime::{RuntimeConfig, SignalRuntime};
pub use scheduler::{cron_expression, TickSchedule, TickSource};
pub use worker::{AssetWorker, QuoteTick, SignalTick, SkipReason, WorkerContext};
