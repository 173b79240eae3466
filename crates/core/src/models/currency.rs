use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base currency of every price the market API returns.
pub const BASE_CURRENCY: &str = "USD";

/// The display currency the user picked, plus the latest known exchange
/// rates (units of currency per 1 USD).
///
/// `rates` is replaced wholesale whenever a rate fetch completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPreference {
    /// Three-letter uppercase code, e.g. "EUR"
    pub selected: String,

    /// Currency code → rate relative to USD
    pub rates: HashMap<String, f64>,
}

impl Default for CurrencyPreference {
    fn default() -> Self {
        Self {
            selected: BASE_CURRENCY.to_string(),
            rates: HashMap::new(),
        }
    }
}

impl CurrencyPreference {
    /// Loaded rate for the selected currency, if any.
    #[must_use]
    pub fn selected_rate(&self) -> Option<f64> {
        self.rates.get(&self.selected).copied()
    }
}
