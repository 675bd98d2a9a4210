//! Price data collaborator interface.

use crate::error::EngineError;
use crate::models::market::PriceBar;

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Up to `count` most recent bars for `asset`, ascending by timestamp.
    /// Fails with `EngineError::DataUnavailable`.
    async fn fetch_price_history(
        &self,
        asset: &str,
        interval: &str,
        count: usize,
    ) -> Result<Vec<PriceBar>, EngineError>;

    async fn get_mid_price(&self, asset: &str) -> Result<f64, EngineError>;
}
