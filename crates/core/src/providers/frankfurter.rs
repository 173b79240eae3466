use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use super::traits::ExchangeRateProvider;
use crate::errors::CoreError;
use crate::models::settings::Settings;

const PROVIDER: &str = "Frankfurter";

/// Frankfurter API provider for fiat currency exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data.
/// - **Coverage**: ~30 currencies (EUR, USD, PLN, GBP, JPY, etc.)
/// - **Endpoint**: `/latest?base={base}`
///
/// The response omits the base currency itself; it is added back at 1.0.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.rates_api_url.clone(), settings.request_timeout_secs)
    }

    /// Parse a `/latest` body. `base` is always present in the result at 1.0.
    pub fn parse_latest(body: &str, base: &str) -> Result<HashMap<String, f64>, CoreError> {
        let resp: RatesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse rates for base {base}: {e}"),
        })?;

        let mut rates: HashMap<String, f64> = resp
            .rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        rates.insert(base.to_uppercase(), 1.0);
        Ok(rates)
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ExchangeRateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>, CoreError> {
        let base = base.to_uppercase();
        let url = format!("{}/latest", self.base_url);
        debug!(provider = PROVIDER, %url, %base, "sending request");

        let resp = self
            .client
            .get(&url)
            .query(&[("base", base.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("/latest returned HTTP {status} for base {base}"),
            });
        }

        let body = resp.text().await?;
        Self::parse_latest(&body, &base)
    }
}
