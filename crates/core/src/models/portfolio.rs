use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user-recorded purchase of a coin (a lot).
///
/// Prices are entered by the user in USD and are not checked against
/// the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    /// Unique identifier, assigned once and never reused
    pub id: Uuid,

    /// Coin id (e.g., "bitcoin")
    pub coin: String,

    /// Units held (always positive)
    pub units: f64,

    /// USD paid per unit
    pub purchase_price: f64,

    pub purchase_date: NaiveDate,
}

impl PortfolioEntry {
    pub fn new(
        coin: impl Into<String>,
        units: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin: coin.into(),
            units,
            purchase_price,
            purchase_date,
        }
    }

    /// Cost basis of this lot in USD.
    #[must_use]
    pub fn invested(&self) -> f64 {
        self.purchase_price * self.units
    }

    /// Human-readable summary used in the transaction log,
    /// e.g. `2 units @ $40000`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} units @ ${}", self.units, self.purchase_price)
    }
}

/// What happened to a portfolio entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAction {
    Added,
    Edited,
    Removed,
}

impl std::fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionAction::Added => write!(f, "Added"),
            TransactionAction::Edited => write!(f, "Edited"),
            TransactionAction::Removed => write!(f, "Removed"),
        }
    }
}

/// Immutable audit record of a portfolio change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub coin: String,
    pub action: TransactionAction,
    /// When the change was made
    pub date: DateTime<Utc>,
    pub details: String,
}

impl Transaction {
    /// Record `action` applied to `entry`, stamped now.
    pub fn record(action: TransactionAction, entry: &PortfolioEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin: entry.coin.clone(),
            action,
            date: Utc::now(),
            details: entry.summary(),
        }
    }
}

/// The user's lots plus the append-only log of changes made to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    /// Entries in insertion order
    pub entries: Vec<PortfolioEntry>,

    /// Transaction log, oldest first. Only ever appended to.
    pub transactions: Vec<Transaction>,
}
