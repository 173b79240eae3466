use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A one-shot watch: fires the first time the coin trades at or above `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,

    /// Coin id (e.g., "bitcoin")
    pub coin: String,

    /// USD price that triggers the alert
    pub threshold: f64,
}

impl Alert {
    pub fn new(coin: impl Into<String>, threshold: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            coin: coin.into(),
            threshold,
        }
    }

    /// Whether an observed price crosses this alert's threshold.
    #[must_use]
    pub fn is_crossed_by(&self, price: f64) -> bool {
        price >= self.threshold
    }
}

/// Emitted once when an alert fires. Delivery (toast, log, push) is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotification {
    /// Id of the alert that fired (already removed from the book)
    pub alert_id: Uuid,
    pub coin: String,
    pub threshold: f64,
    /// Live price that triggered it
    pub price: f64,
}

impl AlertNotification {
    #[must_use]
    pub fn title(&self) -> String {
        format!("Price Alert for {}", self.coin)
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!("The price of {} has crossed ${}.", self.coin, self.threshold)
    }
}

/// Active alerts in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertBook {
    pub alerts: Vec<Alert>,
}
