//! Market data served from a recorded JSON price history.
//!
//! The file maps asset names to ascending bar arrays:
//! `{"BTC": [{"timestamp": "...", "open": 1.0, ...}, ...]}`. Each fetch
//! advances a per-asset cursor by one bar so a worker walks the history
//! forward the way a live feed would.

use crate::error::EngineError;
use crate::models::market::PriceBar;
use crate::services::market_data::MarketDataProvider;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct ReplayMarketData {
    history: HashMap<String, Vec<PriceBar>>,
    /// Number of bars served so far per asset.
    cursors: RwLock<HashMap<String, usize>>,
    warmup: usize,
}

impl ReplayMarketData {
    /// `warmup` bars are visible on the first fetch.
    pub fn new(history: HashMap<String, Vec<PriceBar>>, warmup: usize) -> Self {
        Self {
            history,
            cursors: RwLock::new(HashMap::new()),
            warmup: warmup.max(1),
        }
    }

    pub fn from_json(json: &str, warmup: usize) -> Result<Self, EngineError> {
        let mut history: HashMap<String, Vec<PriceBar>> = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(format!("invalid price history: {}", e)))?;
        for bars in history.values_mut() {
            bars.sort_by_key(|bar| bar.timestamp);
        }
        Ok(Self::new(history, warmup))
    }

    pub fn from_file(path: impl AsRef<Path>, warmup: usize) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let provider = Self::from_json(&json, warmup)?;
        info!(
            path = %path.display(),
            assets = provider.history.len(),
            "ReplayMarketData: loaded history for {} assets",
            provider.history.len()
        );
        Ok(provider)
    }

    pub fn assets(&self) -> Vec<String> {
        let mut assets: Vec<String> = self.history.keys().cloned().collect();
        assets.sort();
        assets
    }

    pub fn bars(&self, asset: &str) -> Option<&[PriceBar]> {
        self.history.get(asset).map(Vec::as_slice)
    }

    fn series(&self, asset: &str) -> Result<&[PriceBar], EngineError> {
        match self.history.get(asset) {
            Some(bars) if !bars.is_empty() => Ok(bars),
            Some(_) => Err(EngineError::data_unavailable(asset, "recorded history is empty")),
            None => Err(EngineError::data_unavailable(asset, "no recorded history")),
        }
    }

    async fn visible(&self, asset: &str, len: usize) -> usize {
        let cursors = self.cursors.read().await;
        cursors.get(asset).copied().unwrap_or(self.warmup).min(len)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for ReplayMarketData {
    async fn fetch_price_history(
        &self,
        asset: &str,
        interval: &str,
        count: usize,
    ) -> Result<Vec<PriceBar>, EngineError> {
        let bars = self.series(asset)?;
        let end = {
            let mut cursors = self.cursors.write().await;
            let end = match cursors.get(asset) {
                Some(served) => served + 1,
                None => self.warmup,
            }
            .min(bars.len());
            cursors.insert(asset.to_string(), end);
            end
        };
        let start = end.saturating_sub(count);
        debug!(
            asset = %asset,
            interval = %interval,
            start = start,
            end = end,
            "ReplayMarketData: serving bars {}..{} for {}",
            start,
            end,
            asset
        );
        Ok(bars[start..end].to_vec())
    }

    async fn get_mid_price(&self, asset: &str) -> Result<f64, EngineError> {
        let bars = self.series(asset)?;
        let visible = self.visible(asset, bars.len()).await;
        bars.get(visible.saturating_sub(1))
            .map(|bar| bar.close)
            .ok_or_else(|| EngineError::data_unavailable(asset, "no visible bars"))
    }
}
