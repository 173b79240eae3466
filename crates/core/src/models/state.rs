use serde::{Deserialize, Serialize};

use super::alert::AlertBook;
use super::currency::CurrencyPreference;
use super::market::MarketSnapshot;
use super::portfolio::Portfolio;
use super::watchlist::Watchlist;

/// The single source of truth for a dashboard session.
///
/// Owned by `CryptoDashboard`; mutated only through its named operations.
/// Lives in memory for the session and is never written to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardState {
    /// User lots and their transaction log
    pub portfolio: Portfolio,

    /// Active price alerts
    pub alerts: AlertBook,

    /// Flagged coin ids
    pub watchlist: Watchlist,

    /// Display currency and exchange rates
    pub currency: CurrencyPreference,

    /// Latest fetched market data
    pub market: MarketSnapshot,
}
