use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::coin::{CoinDetail, CoinSnapshot};
use crate::models::price::PricePoint;
use crate::models::settings::Settings;

const PROVIDER: &str = "CoinGecko";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const VS_CURRENCY: &str = "usd";

/// CoinGecko API provider for listings, coin detail, live and historical prices.
///
/// - **Free**: public tier needs no key; a demo key raises rate limits.
/// - **Endpoints**: `/coins/markets`, `/coins/{id}`, `/simple/price`,
///   `/coins/{id}/market_chart`
///
/// Coins are addressed by CoinGecko ids ("bitcoin", "ethereum"), not tickers.
/// All prices are requested in USD.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.market_api_url.clone(),
            settings.api_key.clone(),
            settings.request_timeout_secs,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base_url}/{segments...}`. Each segment is percent-encoded as a
    /// single path segment, so a coin id can never change the endpoint.
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let invalid = |message: String| CoreError::InvalidConfig {
            key: "market_api_url".into(),
            message,
        };
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("'{}' is not a valid URL: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| invalid(format!("'{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET the endpoint at `segments` with `query` and return the body of a 2xx response.
    async fn get_text(&self, segments: &[&str], query: &[(&str, String)]) -> Result<String, CoreError> {
        let url = self.endpoint_url(segments)?;
        let path = url.path().to_string();
        debug!(provider = PROVIDER, %path, "sending request");

        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("{path} returned HTTP {status}"),
            });
        }
        Ok(resp.text().await?)
    }

    // ── Payload parsing (no I/O) ────────────────────────────────────

    /// Parse a `/coins/markets` body. Null numeric fields become 0.
    pub fn parse_markets(body: &str) -> Result<Vec<CoinSnapshot>, CoreError> {
        let rows: Vec<MarketRow> = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse market listings: {e}"),
        })?;

        Ok(rows
            .into_iter()
            .map(|r| CoinSnapshot {
                id: r.id,
                name: r.name,
                symbol: r.symbol,
                image: r.image.unwrap_or_default(),
                current_price: r.current_price.unwrap_or(0.0),
                market_cap: r.market_cap.unwrap_or(0.0),
                price_change_percentage_24h: r.price_change_percentage_24h.unwrap_or(0.0),
            })
            .collect())
    }

    /// Parse a `/coins/{id}` body. A coin without a USD price is an error.
    pub fn parse_coin_detail(body: &str) -> Result<CoinDetail, CoreError> {
        let resp: DetailResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse coin detail: {e}"),
        })?;

        let market = resp.market_data.unwrap_or_default();
        let current_price = usd_value(&market.current_price).ok_or_else(|| {
            CoreError::PriceNotAvailable {
                coin: resp.id.clone(),
            }
        })?;

        Ok(CoinDetail {
            description: resp.description.en.unwrap_or_default(),
            current_price,
            market_cap: usd_value(&market.market_cap).unwrap_or(0.0),
            price_change_percentage_24h: market.price_change_percentage_24h.unwrap_or(0.0),
            id: resp.id,
            name: resp.name,
            symbol: resp.symbol,
        })
    }

    /// Parse a `/simple/price` body into coin id → USD price.
    pub fn parse_simple_prices(body: &str) -> Result<HashMap<String, f64>, CoreError> {
        let resp: HashMap<String, HashMap<String, Option<f64>>> = serde_json::from_str(body)
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse simple prices: {e}"),
            })?;

        Ok(resp
            .into_iter()
            .filter_map(|(id, quotes)| usd_value(&quotes).map(|price| (id, price)))
            .collect())
    }

    /// Parse a `/coins/{id}/market_chart` body into a timestamp-sorted series.
    pub fn parse_market_chart(body: &str) -> Result<Vec<PricePoint>, CoreError> {
        let resp: MarketChartResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse price history: {e}"),
        })?;

        let mut points: Vec<PricePoint> = resp
            .prices
            .into_iter()
            .filter_map(|(millis, price)| PricePoint::from_millis(millis as i64, price?))
            .collect();
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn usd_value(quotes: &HashMap<String, Option<f64>>) -> Option<f64> {
    quotes.get(VS_CURRENCY).copied().flatten()
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct MarketRow {
    id: String,
    name: String,
    symbol: String,
    image: Option<String>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

#[derive(Deserialize)]
struct DetailResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    description: Description,
    market_data: Option<DetailMarketData>,
}

#[derive(Deserialize, Default)]
struct Description {
    en: Option<String>,
}

#[derive(Deserialize, Default)]
struct DetailMarketData {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
    price_change_percentage_24h: Option<f64>,
}

#[derive(Deserialize)]
struct MarketChartResponse {
    /// `[unix_millis, price]` pairs
    prices: Vec<(f64, Option<f64>)>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn list_coins(&self, limit: u32) -> Result<Vec<CoinSnapshot>, CoreError> {
        let body = self
            .get_text(
                &["coins", "markets"],
                &[
                    ("vs_currency", VS_CURRENCY.to_string()),
                    ("order", "market_cap_desc".to_string()),
                    ("per_page", limit.to_string()),
                    ("page", "1".to_string()),
                ],
            )
            .await?;
        Self::parse_markets(&body)
    }

    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        let body = self
            .get_text(
                &["coins", id],
                &[
                    ("localization", "false".to_string()),
                    ("tickers", "false".to_string()),
                    ("market_data", "true".to_string()),
                    ("community_data", "false".to_string()),
                    ("developer_data", "false".to_string()),
                ],
            )
            .await?;
        Self::parse_coin_detail(&body)
    }

    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, CoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let body = self
            .get_text(
                &["simple", "price"],
                &[
                    ("ids", ids.join(",")),
                    ("vs_currencies", VS_CURRENCY.to_string()),
                ],
            )
            .await?;
        Self::parse_simple_prices(&body)
    }

    async fn price_history(&self, id: &str, days: u32) -> Result<Vec<PricePoint>, CoreError> {
        let body = self
            .get_text(
                &["coins", id, "market_chart"],
                &[
                    ("vs_currency", VS_CURRENCY.to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;
        Self::parse_market_chart(&body)
    }
}
