use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::coin::{CoinDetail, CoinSnapshot};
use crate::models::price::PricePoint;

/// Read-only access to a market-data API.
///
/// Every price is in USD. Implementations do not cache or retry; the
/// caller decides what to keep and when to ask again.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Top `limit` coins by market capitalization, largest first.
    async fn list_coins(&self, limit: u32) -> Result<Vec<CoinSnapshot>, CoreError>;

    /// Full detail for one coin.
    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError>;

    /// Current USD price for each of `ids`. Unknown ids are simply absent
    /// from the returned map.
    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, CoreError>;

    /// Price series for one coin covering the last `days` days,
    /// sorted by timestamp.
    async fn price_history(&self, id: &str, days: u32) -> Result<Vec<PricePoint>, CoreError>;
}

/// Source of fiat exchange rates.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ExchangeRateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Latest rates expressed as units of each currency per one unit of `base`.
    /// The returned map always contains `base` itself at 1.0.
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>, CoreError>;
}
