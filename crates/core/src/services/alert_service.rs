use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertBook, AlertNotification};

/// Maintains threshold alerts and decides which ones fire.
///
/// Firing is one-shot: an alert that fires is removed, so it can never
/// fire twice. Notifying the user is left to the caller.
pub struct AlertService;

impl AlertService {
    pub fn new() -> Self {
        Self
    }

    /// Add an alert. Several alerts per coin, even with equal thresholds, are allowed.
    pub fn add_alert(&self, book: &mut AlertBook, coin: &str, threshold: f64) -> Result<Uuid, CoreError> {
        let coin = coin.trim();
        if coin.is_empty() {
            return Err(CoreError::ValidationError("Coin must not be empty".into()));
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Alert threshold must be positive, got {threshold}"
            )));
        }

        let mut alert = Alert::new(coin, threshold);
        while book.alerts.iter().any(|a| a.id == alert.id) {
            alert.id = Uuid::new_v4();
        }
        let id = alert.id;
        book.alerts.push(alert);
        Ok(id)
    }

    pub fn remove_alert(&self, book: &mut AlertBook, alert_id: Uuid) -> Result<Alert, CoreError> {
        let idx = book
            .alerts
            .iter()
            .position(|a| a.id == alert_id)
            .ok_or_else(|| CoreError::AlertNotFound(alert_id.to_string()))?;
        Ok(book.alerts.remove(idx))
    }

    pub fn alerts_for_coin<'a>(&self, book: &'a AlertBook, coin: &str) -> Vec<&'a Alert> {
        book.alerts.iter().filter(|a| a.coin == coin).collect()
    }

    /// Distinct coins with at least one alert, first-seen order.
    pub fn watched_coins(&self, book: &AlertBook) -> Vec<String> {
        let mut coins: Vec<String> = Vec::new();
        for alert in &book.alerts {
            if !coins.contains(&alert.coin) {
                coins.push(alert.coin.clone());
            }
        }
        coins
    }

    /// Check every alert against the live prices.
    ///
    /// Alerts whose coin trades at or above their threshold are removed and
    /// reported, in insertion order. Coins without a known price never fire.
    pub fn evaluate(&self, book: &mut AlertBook, prices: &HashMap<String, f64>) -> Vec<AlertNotification> {
        let mut fired = Vec::new();

        book.alerts.retain(|alert| {
            let Some(&price) = prices.get(&alert.coin) else {
                return true;
            };
            if !alert.is_crossed_by(price) {
                return true;
            }
            info!(coin = %alert.coin, threshold = alert.threshold, price, "price alert fired");
            fired.push(AlertNotification {
                alert_id: alert.id,
                coin: alert.coin.clone(),
                threshold: alert.threshold,
                price,
            });
            false
        });

        fired
    }
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}
