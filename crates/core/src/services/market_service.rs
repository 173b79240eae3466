use std::collections::HashMap;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::coin::CoinDetail;
use crate::models::currency::BASE_CURRENCY;
use crate::models::market::MarketSnapshot;
use crate::models::settings::{MAX_HISTORY_DAYS, MAX_LISTING_LIMIT};
use crate::providers::traits::{ExchangeRateProvider, MarketDataProvider};

/// Fetches market data and writes it into the `MarketSnapshot`.
///
/// Update policy:
/// - Every successful response overwrites the snapshot entry for its key,
///   so the most recently completed fetch wins.
/// - A failed fetch leaves whatever was stored before untouched.
/// - No retries: a failure is returned to the caller as-is.
pub struct MarketService {
    market: Box<dyn MarketDataProvider>,
    rates: Box<dyn ExchangeRateProvider>,
}

impl MarketService {
    pub fn new(market: Box<dyn MarketDataProvider>, rates: Box<dyn ExchangeRateProvider>) -> Self {
        Self { market, rates }
    }

    /// Name of the market-data provider (for display/logs).
    pub fn provider_name(&self) -> &str {
        self.market.name()
    }

    /// Name of the exchange-rate provider.
    pub fn rates_provider_name(&self) -> &str {
        self.rates.name()
    }

    /// Fetch the top `limit` coins and replace the stored listings.
    /// Returns the number of coins received.
    pub async fn refresh_listings(
        &self,
        snapshot: &mut MarketSnapshot,
        limit: u32,
    ) -> Result<usize, CoreError> {
        if limit == 0 || limit > MAX_LISTING_LIMIT {
            return Err(CoreError::ValidationError(format!(
                "Listing limit must be between 1 and {MAX_LISTING_LIMIT}, got {limit}"
            )));
        }

        let listings = self.market.list_coins(limit).await?;
        let count = listings.len();
        snapshot.set_listings(listings);
        info!(provider = self.market.name(), count, "listings refreshed");
        Ok(count)
    }

    /// Fetch full detail for one coin. Not stored in the snapshot.
    pub async fn coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::ValidationError("Coin id must not be empty".into()));
        }
        self.market.coin_detail(id).await
    }

    /// Fetch live prices for `coins` in a single request and merge them into
    /// the snapshot. An empty set sends no request.
    ///
    /// Prices that are not finite and non-negative are dropped.
    /// Returns the number of prices stored.
    pub async fn refresh_prices(
        &self,
        snapshot: &mut MarketSnapshot,
        coins: &[String],
    ) -> Result<usize, CoreError> {
        if coins.is_empty() {
            return Ok(0);
        }

        let fetched = self.market.simple_prices(coins).await?;
        let valid: HashMap<String, f64> = fetched
            .into_iter()
            .filter(|(coin, price)| {
                let ok = price.is_finite() && *price >= 0.0;
                if !ok {
                    warn!(provider = self.market.name(), %coin, price, "dropping invalid price");
                }
                ok
            })
            .collect();

        for coin in coins {
            if !valid.contains_key(coin) {
                warn!(provider = self.market.name(), %coin, "no live price returned");
            }
        }

        snapshot.set_prices(&valid);
        info!(provider = self.market.name(), count = valid.len(), "prices refreshed");
        Ok(valid.len())
    }

    /// Fetch the last `days` days of history for each coin.
    ///
    /// Successful series are stored even if other coins fail; if any coin
    /// failed, the last error is returned after all coins were attempted.
    /// Returns the number of series stored.
    pub async fn refresh_history(
        &self,
        snapshot: &mut MarketSnapshot,
        coins: &[String],
        days: u32,
    ) -> Result<usize, CoreError> {
        if days == 0 || days > MAX_HISTORY_DAYS {
            return Err(CoreError::ValidationError(format!(
                "History window must be between 1 and {MAX_HISTORY_DAYS} days, got {days}"
            )));
        }

        let mut stored = 0;
        let mut last_error = None;

        for coin in coins {
            match self.market.price_history(coin, days).await {
                Ok(points) => {
                    snapshot.set_history(coin, points);
                    stored += 1;
                }
                Err(e) => {
                    warn!(provider = self.market.name(), %coin, error = %e, "history fetch failed");
                    last_error = Some(e);
                }
            }
        }

        info!(provider = self.market.name(), stored, days, "history refreshed");
        match last_error {
            Some(e) => Err(e),
            None => Ok(stored),
        }
    }

    /// Latest USD-based exchange rates. `USD` is always present at 1.0.
    pub async fn fetch_exchange_rates(&self) -> Result<HashMap<String, f64>, CoreError> {
        let mut rates = self.rates.latest_rates(BASE_CURRENCY).await?;
        rates.insert(BASE_CURRENCY.to_string(), 1.0);
        info!(provider = self.rates.name(), count = rates.len(), "exchange rates fetched");
        Ok(rates)
    }
}
