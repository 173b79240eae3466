use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::services::currency_service::normalize_currency_code;

/// Largest page the markets endpoint accepts.
pub const MAX_LISTING_LIMIT: u32 = 250;

/// Maximum history window in days (10 years).
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Runtime configuration for the dashboard core.
///
/// Every field has a default, so a partial JSON document or an empty
/// environment produces a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Initial display currency (e.g., "USD", "EUR", "PLN").
    pub default_currency: String,

    /// Base URL of the CoinGecko-compatible market-data API.
    pub market_api_url: String,

    /// Base URL of the Frankfurter exchange-rate API.
    pub rates_api_url: String,

    /// Optional market-data API key, sent as `x-cg-demo-api-key`.
    pub api_key: Option<String>,

    /// How many coins the listings view fetches.
    pub listing_limit: u32,

    /// History window (days) used for portfolio and coin charts.
    pub history_days: u32,

    /// Per-request timeout for native HTTP clients.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            market_api_url: "https://api.coingecko.com/api/v3".to_string(),
            rates_api_url: "https://api.frankfurter.dev/v1".to_string(),
            api_key: None,
            listing_limit: 100,
            history_days: 7,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Read settings from the process environment (`DASHBOARD_*` variables).
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Build settings from an explicit variable map. Unset keys keep their defaults.
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self, CoreError> {
        let mut settings = Self::default();

        if let Some(v) = env.get("DASHBOARD_CURRENCY") {
            settings.default_currency = v.clone();
        }
        if let Some(v) = env.get("DASHBOARD_MARKET_API_URL") {
            settings.market_api_url = v.clone();
        }
        if let Some(v) = env.get("DASHBOARD_RATES_API_URL") {
            settings.rates_api_url = v.clone();
        }
        if let Some(v) = env.get("DASHBOARD_API_KEY") {
            let trimmed = v.trim();
            settings.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(v) = env.get("DASHBOARD_LISTING_LIMIT") {
            settings.listing_limit = parse_number("DASHBOARD_LISTING_LIMIT", v)?;
        }
        if let Some(v) = env.get("DASHBOARD_HISTORY_DAYS") {
            settings.history_days = parse_number("DASHBOARD_HISTORY_DAYS", v)?;
        }
        if let Some(v) = env.get("DASHBOARD_REQUEST_TIMEOUT_SECS") {
            settings.request_timeout_secs = parse_number("DASHBOARD_REQUEST_TIMEOUT_SECS", v)?;
        }

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Canonicalize free-form input: trimmed upper-case currency code,
    /// URLs without surrounding whitespace or trailing '/'. Never fails.
    pub fn normalize(&mut self) {
        self.default_currency = self.default_currency.trim().to_uppercase();
        for url in [&mut self.market_api_url, &mut self.rates_api_url] {
            *url = url.trim().trim_end_matches('/').to_string();
        }
    }

    /// Check every field without changing any of them.
    pub fn validate(&self) -> Result<(), CoreError> {
        normalize_currency_code(&self.default_currency).map_err(|e| CoreError::InvalidConfig {
            key: "default_currency".into(),
            message: e.to_string(),
        })?;

        for (key, url) in [
            ("market_api_url", &self.market_api_url),
            ("rates_api_url", &self.rates_api_url),
        ] {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::InvalidConfig {
                    key: key.into(),
                    message: format!("'{url}' is not an http(s) URL"),
                });
            }
        }

        if self.listing_limit == 0 || self.listing_limit > MAX_LISTING_LIMIT {
            return Err(CoreError::InvalidConfig {
                key: "listing_limit".into(),
                message: format!("must be between 1 and {MAX_LISTING_LIMIT}"),
            });
        }
        if self.history_days == 0 || self.history_days > MAX_HISTORY_DAYS {
            return Err(CoreError::InvalidConfig {
                key: "history_days".into(),
                message: format!("must be between 1 and {MAX_HISTORY_DAYS}"),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::InvalidConfig {
                key: "request_timeout_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value.trim().parse().map_err(|_| CoreError::InvalidConfig {
        key: key.to_string(),
        message: format!("'{value}' is not a valid number"),
    })
}
