//! Market-making quote generation and refresh.

pub mod inventory;
pub mod ladder;
pub mod refresh;
pub mod skew;

pub use inventory::adjust_for_inventory;
pub use ladder::QuoteEngine;
pub use refresh::{RefreshDecision, RefreshReason, RefreshScheduler};
pub use skew::{SkewBlender, MIN_CLIP_FRACTION};
