use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Valuation of the whole portfolio against the latest live prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Currency used for all monetary values
    pub currency: String,

    /// USD → `currency` multiplier applied to every figure
    pub exchange_rate: f64,

    /// Sum of every entry's current market value
    pub total_value: f64,

    /// Sum of every entry's cost basis (purchase price × units)
    pub total_invested: f64,

    /// total_value - total_invested
    pub total_profit_loss: f64,

    /// (total_profit_loss / total_invested) * 100, or 0 with nothing invested
    pub total_return_pct: f64,

    /// Coins held that had no live price; their entries were valued at 0
    pub unpriced_coins: Vec<String>,

    /// Per-entry breakdown, in portfolio order
    pub entries: Vec<EntryValuation>,
}

/// Valuation of a single portfolio entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryValuation {
    pub entry_id: Uuid,

    pub coin: String,

    pub units: f64,

    /// Purchase price per unit, converted to the display currency
    pub purchase_price: f64,

    /// Live price per unit in the display currency, `None` when unknown
    pub current_price: Option<f64>,

    /// Current value (0 when the price is unknown)
    pub total_value: f64,

    /// Cost basis
    pub invested: f64,

    /// (current price − purchase price) × units, current price taken as 0 when unknown
    pub profit_loss: f64,

    pub return_pct: f64,

    /// Share of the portfolio's total value, in percent
    pub allocation_pct: f64,
}
