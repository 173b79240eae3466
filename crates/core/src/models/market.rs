use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::alert::AlertNotification;
use super::coin::CoinSnapshot;
use super::price::PricePoint;
use crate::errors::CoreError;

/// Outcome of a full refresh: alerts that fired plus every fetch that failed.
/// A failure in one query does not stop the others.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub notifications: Vec<AlertNotification>,
    pub failures: Vec<CoreError>,
}

impl RefreshReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Query keys used to stamp when each piece of market data last arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarketQuery {
    Listings,
    Price(String),
    History(String),
}

/// Latest market data received from the API.
///
/// Every write overwrites whatever was stored under the same key, so the
/// last response to resolve wins. Nothing here is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Top coins by market cap, in API order
    pub listings: Vec<CoinSnapshot>,

    /// Live USD price per coin id
    pub prices: HashMap<String, f64>,

    /// Historical USD series per coin id, sorted by timestamp
    pub history: HashMap<String, Vec<PricePoint>>,

    /// When each query last completed. Not serialized: JSON maps need string keys.
    #[serde(skip)]
    pub updated_at: HashMap<MarketQuery, DateTime<Utc>>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live price of a coin, if one has been fetched.
    #[must_use]
    pub fn price(&self, coin: &str) -> Option<f64> {
        self.prices.get(coin).copied()
    }

    /// Historical series of a coin (empty if never fetched).
    #[must_use]
    pub fn history(&self, coin: &str) -> &[PricePoint] {
        self.history.get(coin).map_or(&[], Vec::as_slice)
    }

    pub fn set_listings(&mut self, listings: Vec<CoinSnapshot>) {
        self.listings = listings;
        self.updated_at.insert(MarketQuery::Listings, Utc::now());
    }

    pub fn set_price(&mut self, coin: &str, price: f64) {
        self.prices.insert(coin.to_string(), price);
        self.updated_at
            .insert(MarketQuery::Price(coin.to_string()), Utc::now());
    }

    /// Merge a batch of live prices. Coins missing from the batch keep their
    /// previous price.
    pub fn set_prices(&mut self, prices: &HashMap<String, f64>) {
        for (coin, price) in prices {
            self.set_price(coin, *price);
        }
    }

    /// Replace the history of a coin. Points are stored sorted by timestamp.
    pub fn set_history(&mut self, coin: &str, mut points: Vec<PricePoint>) {
        points.sort_by_key(|p| p.timestamp);
        self.history.insert(coin.to_string(), points);
        self.updated_at
            .insert(MarketQuery::History(coin.to_string()), Utc::now());
    }

    #[must_use]
    pub fn last_updated(&self, query: &MarketQuery) -> Option<DateTime<Utc>> {
        self.updated_at.get(query).copied()
    }

    /// Listings whose name or symbol contains `query` (case-insensitive).
    #[must_use]
    pub fn search_listings(&self, query: &str) -> Vec<&CoinSnapshot> {
        self.listings.iter().filter(|c| c.matches(query)).collect()
    }

    /// Look up a listing row by coin id.
    #[must_use]
    pub fn listing(&self, coin: &str) -> Option<&CoinSnapshot> {
        self.listings.iter().find(|c| c.id == coin)
    }

    /// Drop everything fetched so far.
    pub fn clear(&mut self) {
        self.listings.clear();
        self.prices.clear();
        self.history.clear();
        self.updated_at.clear();
    }
}
