//! Signal-and-quote decision core: EMA crossover signals with risk levels,
//! and tiered market-making quotes skewed by the latest signal.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod quotes;
pub mod services;
pub mod signals;

pub use error::EngineError;
