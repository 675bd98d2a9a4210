//! Capital pool shared by every asset task.

use crate::models::signal::SignalAction;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct PoolState {
    total_usd: f64,
    active: BTreeSet<String>,
}

/// Splits a fixed balance equally across assets with an active directional
/// signal. Every rebalance holds the lock for its whole read-modify-write.
#[derive(Debug, Clone)]
pub struct AllocationPool {
    state: Arc<Mutex<PoolState>>,
}

impl AllocationPool {
    pub fn new(total_usd: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                total_usd,
                active: BTreeSet::new(),
            })),
        }
    }

    /// Record `action` for `asset` and return its share. Holds leave the
    /// asset's membership untouched.
    pub async fn rebalance(&self, asset: &str, action: SignalAction) -> Option<f64> {
        let mut state = self.state.lock().await;
        if action.is_directional() {
            state.active.insert(asset.to_string());
        }
        let share = share_of(&state, asset);
        debug!(
            asset = %asset,
            active = state.active.len(),
            share = ?share,
            "AllocationPool: rebalanced across {} assets",
            state.active.len()
        );
        share
    }

    pub async fn release(&self, asset: &str) {
        self.state.lock().await.active.remove(asset);
    }

    pub async fn allocation(&self, asset: &str) -> Option<f64> {
        share_of(&*self.state.lock().await, asset)
    }

    /// Sum of every active share; never exceeds the pool.
    pub async fn allocated_usd(&self) -> f64 {
        let state = self.state.lock().await;
        state
            .active
            .iter()
            .filter_map(|asset| share_of(&state, asset))
            .sum()
    }
}

fn share_of(state: &PoolState, asset: &str) -> Option<f64> {
    if state.total_usd <= 0.0 || !state.active.contains(asset) {
        return None;
    }
    Some(state.total_usd / state.active.len() as f64)
}
