use serde::{Deserialize, Serialize};

/// One row of the market listings (top coins by market cap).
///
/// Owned by the market-data API, never edited locally. All monetary
/// values are in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSnapshot {
    /// Stable coin id, e.g. "bitcoin"
    pub id: String,

    /// Display name, e.g. "Bitcoin"
    pub name: String,

    /// Ticker symbol as returned by the API (usually lowercase, e.g. "btc")
    pub symbol: String,

    /// Logo URL
    pub image: String,

    pub current_price: f64,

    pub market_cap: f64,

    /// Price change over the last 24 hours, in percent
    pub price_change_percentage_24h: f64,
}

impl CoinSnapshot {
    /// Case-insensitive substring match against name or symbol.
    /// An empty (or all-whitespace) query matches every coin.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q) || self.symbol.to_lowercase().contains(&q)
    }

    /// Ticker in display form ("BTC").
    #[must_use]
    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }
}

/// Full detail for a single coin, shown on the coin page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// English description, may contain HTML from the upstream API
    pub description: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub price_change_percentage_24h: f64,
}
