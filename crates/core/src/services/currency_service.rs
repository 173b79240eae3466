use std::collections::HashMap;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::currency::{CurrencyPreference, BASE_CURRENCY};

/// Upper-case and check a currency code: exactly three ASCII letters.
pub fn normalize_currency_code(code: &str) -> Result<String, CoreError> {
    let trimmed = code.trim().to_uppercase();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::ValidationError(format!(
            "Invalid currency code '{code}': must be exactly 3 ASCII letters (e.g., USD, EUR, PLN)"
        )));
    }
    Ok(trimmed)
}

/// Converts USD amounts into the user's display currency.
///
/// Market prices and purchase prices are all USD. Conversion multiplies by
/// the cached USD → selected rate; when no rate is loaded the amount is
/// left as-is (multiplier 1.0).
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Switch the display currency. Loaded rates are kept.
    pub fn set_currency(&self, pref: &mut CurrencyPreference, code: &str) -> Result<(), CoreError> {
        pref.selected = normalize_currency_code(code)?;
        self.warn_if_unconverted(pref);
        Ok(())
    }

    /// Replace all cached rates with a freshly fetched set.
    /// Non-finite and non-positive rates are discarded.
    pub fn replace_rates(&self, pref: &mut CurrencyPreference, rates: HashMap<String, f64>) {
        pref.rates = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        pref.rates.insert(BASE_CURRENCY.to_string(), 1.0);
        self.warn_if_unconverted(pref);
    }

    /// USD → selected multiplier, 1.0 while no rate is loaded.
    /// Silent: the missing rate is reported once, when the preference changes.
    pub fn rate(&self, pref: &CurrencyPreference) -> f64 {
        if pref.selected == BASE_CURRENCY {
            return 1.0;
        }
        pref.selected_rate().unwrap_or(1.0)
    }

    /// Whether `rate()` is backed by a real exchange rate.
    pub fn has_rate(&self, pref: &CurrencyPreference) -> bool {
        pref.selected == BASE_CURRENCY || pref.selected_rate().is_some()
    }

    /// Convert a USD amount into the selected currency.
    pub fn convert(&self, pref: &CurrencyPreference, amount_usd: f64) -> f64 {
        amount_usd * self.rate(pref)
    }

    fn warn_if_unconverted(&self, pref: &CurrencyPreference) {
        if !self.has_rate(pref) {
            warn!(currency = %pref.selected, "no exchange rate loaded, showing USD amounts");
        }
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
