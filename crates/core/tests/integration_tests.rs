// ═══════════════════════════════════════════════════════════════════
// Integration Tests — CryptoDashboard facade with mock providers
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crypto_dashboard_core::errors::CoreError;
use crypto_dashboard_core::models::coin::{CoinDetail, CoinSnapshot};
use crypto_dashboard_core::models::portfolio::TransactionAction;
use crypto_dashboard_core::models::price::PricePoint;
use crypto_dashboard_core::models::settings::Settings;
use crypto_dashboard_core::providers::traits::{ExchangeRateProvider, MarketDataProvider};
use crypto_dashboard_core::CryptoDashboard;

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// Market whose live prices can be moved between refreshes.
#[derive(Clone)]
struct MockMarket {
    prices: Arc<Mutex<HashMap<String, f64>>>,
    fail_history: bool,
}

impl MockMarket {
    fn new() -> Self {
        let prices = HashMap::from([
            ("bitcoin".to_string(), 50000.0),
            ("ethereum".to_string(), 3000.0),
            ("solana".to_string(), 150.0),
        ]);
        Self {
            prices: Arc::new(Mutex::new(prices)),
            fail_history: false,
        }
    }

    fn set_price(&self, coin: &str, price: f64) {
        self.prices.lock().unwrap().insert(coin.to_string(), price);
    }
}

fn listing(id: &str, name: &str, symbol: &str, price: f64) -> CoinSnapshot {
    CoinSnapshot {
        id: id.into(),
        name: name.into(),
        symbol: symbol.into(),
        image: String::new(),
        current_price: price,
        market_cap: price * 1_000_000.0,
        price_change_percentage_24h: 0.0,
    }
}

fn at(y: i32, m: u32, d: u32) -> PricePoint {
    PricePoint::new(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(), 0.0)
}

#[async_trait]
impl MarketDataProvider for MockMarket {
    fn name(&self) -> &str {
        "MockMarket"
    }

    async fn list_coins(&self, limit: u32) -> Result<Vec<CoinSnapshot>, CoreError> {
        let all = vec![
            listing("bitcoin", "Bitcoin", "btc", 50000.0),
            listing("ethereum", "Ethereum", "eth", 3000.0),
            listing("solana", "Solana", "sol", 150.0),
        ];
        Ok(all.into_iter().take(limit as usize).collect())
    }

    async fn coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        let price = self
            .prices
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .ok_or_else(|| CoreError::PriceNotAvailable { coin: id.into() })?;
        Ok(CoinDetail {
            id: id.into(),
            name: id.into(),
            symbol: id.into(),
            description: format!("About {id}"),
            current_price: price,
            market_cap: 0.0,
            price_change_percentage_24h: 0.0,
        })
    }

    async fn simple_prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, CoreError> {
        let prices = self.prices.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| prices.get(id).map(|p| (id.clone(), *p)))
            .collect())
    }

    async fn price_history(&self, id: &str, _days: u32) -> Result<Vec<PricePoint>, CoreError> {
        if self.fail_history {
            return Err(CoreError::Network("timed out".into()));
        }
        let base = match id {
            "bitcoin" => 40000.0,
            "ethereum" => 2000.0,
            _ => 1.0,
        };
        Ok((1..=3)
            .map(|day| {
                let mut p = at(2024, 1, day);
                p.price = base + f64::from(day) * 1000.0;
                p
            })
            .collect())
    }
}

struct MockRates {
    fail: bool,
}

#[async_trait]
impl ExchangeRateProvider for MockRates {
    fn name(&self) -> &str {
        "MockRates"
    }

    async fn latest_rates(&self, _base: &str) -> Result<HashMap<String, f64>, CoreError> {
        if self.fail {
            return Err(CoreError::Api {
                provider: "MockRates".into(),
                message: "/latest returned HTTP 503 Service Unavailable".into(),
            });
        }
        Ok(HashMap::from([("EUR".to_string(), 0.5), ("USD".to_string(), 1.0)]))
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dashboard_with(market: MockMarket, rates_fail: bool) -> CryptoDashboard {
    CryptoDashboard::with_providers(
        Settings::default(),
        Box::new(market),
        Box::new(MockRates { fail: rates_fail }),
    )
    .unwrap()
}

fn dashboard() -> CryptoDashboard {
    dashboard_with(MockMarket::new(), false)
}

// ═══════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════

#[test]
fn starts_empty_in_default_currency() {
    let settings = Settings {
        default_currency: "eur".into(),
        ..Settings::default()
    };
    let dash = CryptoDashboard::with_providers(
        settings,
        Box::new(MockMarket::new()),
        Box::new(MockRates { fail: false }),
    )
    .unwrap();

    assert_eq!(dash.currency().selected, "EUR");
    assert!(dash.entries().is_empty());
    assert!(dash.alerts().is_empty());
    assert!(dash.watchlist().is_empty());
    assert!(dash.listings().is_empty());
    // No EUR rate loaded yet.
    assert_eq!(dash.exchange_rate(), 1.0);
}

#[test]
fn invalid_settings_are_rejected() {
    let settings = Settings {
        history_days: 0,
        ..Settings::default()
    };
    let err = CryptoDashboard::with_providers(
        settings,
        Box::new(MockMarket::new()),
        Box::new(MockRates { fail: false }),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfig { .. }));
}

#[test]
fn debug_output_summarizes_state() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 1.0, 1.0, d(2024, 1, 1)).unwrap();
    let debug = format!("{dash:?}");
    assert!(debug.contains("CryptoDashboard"));
    assert!(debug.contains("entries: 1"));
    assert!(debug.contains("MockMarket"));
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio workflow
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn add_refresh_and_value() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 2.0, 40000.0, d(2024, 1, 1)).unwrap();
    dash.add_entry("ethereum", 10.0, 2500.0, d(2024, 1, 5)).unwrap();

    let fired = dash.refresh_prices().await.unwrap();
    assert!(fired.is_empty());
    assert_eq!(dash.live_price("bitcoin").unwrap(), 50000.0);

    let v = dash.valuation();
    assert_eq!(v.currency, "USD");
    assert_eq!(v.total_value, 130000.0);
    assert_eq!(v.total_invested, 105000.0);
    assert_eq!(v.total_profit_loss, 25000.0);
}

#[test]
fn valuation_before_any_fetch_lists_unpriced_coins() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 1.0, 40000.0, d(2024, 1, 1)).unwrap();

    let v = dash.valuation();
    assert_eq!(v.total_value, 0.0);
    assert_eq!(v.unpriced_coins, vec!["bitcoin"]);
    assert!(matches!(
        dash.live_price("bitcoin"),
        Err(CoreError::PriceNotAvailable { .. })
    ));
}

#[test]
fn edit_and_remove_keep_an_audit_trail() {
    let mut dash = dashboard();
    let id = dash.add_entry("solana", 10.0, 100.0, d(2024, 2, 1)).unwrap();

    let mut entry = dash.get_entry(id).unwrap().clone();
    entry.units = 12.0;
    dash.edit_entry(entry).unwrap();
    dash.remove_entry(id).unwrap();

    assert!(dash.entries().is_empty());
    assert!(dash.held_coins().is_empty());
    let log: Vec<(TransactionAction, &str)> = dash
        .transactions_for_coin("solana")
        .iter()
        .map(|t| (t.action, t.details.as_str()))
        .collect();
    assert_eq!(
        log,
        vec![
            (TransactionAction::Added, "10 units @ $100"),
            (TransactionAction::Edited, "12 units @ $100"),
            (TransactionAction::Removed, "12 units @ $100"),
        ]
    );
    assert!(matches!(dash.remove_entry(id), Err(CoreError::EntryNotFound(_))));
    assert_eq!(dash.transactions().len(), 3);
}

// ═══════════════════════════════════════════════════════════════════
// Alerts
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn alert_fires_once_across_refreshes() {
    let market = MockMarket::new();
    let mut dash = dashboard_with(market.clone(), false);
    // Alerted coins are priced even when not held.
    dash.add_alert("bitcoin", 60000.0).unwrap();

    let mut fired = Vec::new();
    for price in [59000.0, 61000.0, 59000.0, 62000.0] {
        market.set_price("bitcoin", price);
        fired.extend(dash.refresh_prices().await.unwrap());
    }

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].price, 61000.0);
    assert_eq!(fired[0].title(), "Price Alert for bitcoin");
    assert!(dash.alerts().is_empty());
}

#[test]
fn apply_prices_evaluates_alerts_and_skips_bad_values() {
    let mut dash = dashboard();
    dash.add_alert("ethereum", 3500.0).unwrap();
    let keep = dash.add_alert("solana", 200.0).unwrap();

    let fired = dash.apply_prices(HashMap::from([
        ("ethereum".to_string(), 3600.0),
        ("solana".to_string(), f64::NAN),
    ]));

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].coin, "ethereum");
    assert_eq!(dash.alerts().len(), 1);
    assert_eq!(dash.alerts()[0].id, keep);
    assert!(dash.live_price("solana").is_err());
}

#[test]
fn removed_alert_never_fires() {
    let mut dash = dashboard();
    let id = dash.add_alert("bitcoin", 10.0).unwrap();
    dash.remove_alert(id).unwrap();
    assert!(dash
        .apply_prices(HashMap::from([("bitcoin".to_string(), 50000.0)]))
        .is_empty());
    assert!(matches!(dash.remove_alert(id), Err(CoreError::AlertNotFound(_))));
}

// ═══════════════════════════════════════════════════════════════════
// Listings & watchlist
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn listings_search_and_watchlist() {
    let mut dash = dashboard();
    assert_eq!(dash.refresh_listings().await.unwrap().len(), 3);

    let hits: Vec<&str> = dash.search_listings("SOL").iter().map(|c| c.id.as_str()).collect();
    assert_eq!(hits, vec!["solana"]);

    assert!(dash.watch("solana"));
    assert!(!dash.watch("solana"));
    assert!(dash.toggle_watch("bitcoin"));
    assert!(dash.is_watched("bitcoin"));

    let watched: Vec<&str> = dash
        .watchlist_listings()
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(watched, vec!["bitcoin", "solana"]);

    assert!(dash.unwatch("solana"));
    assert!(!dash.unwatch("solana"));
    assert_eq!(dash.watchlist(), &["bitcoin".to_string()]);
}

#[tokio::test]
async fn coin_detail_and_chart() {
    let mut dash = dashboard();
    let detail = dash.coin_detail("ethereum").await.unwrap();
    assert_eq!(detail.current_price, 3000.0);
    assert!(dash.coin_detail("").await.is_err());

    dash.refresh_coin_history("ethereum", 7).await.unwrap();
    let chart = dash.coin_chart("ethereum");
    assert_eq!(chart.len(), 3);
    assert_eq!(chart[0].price, 3000.0);
    assert!(dash.coin_chart("bitcoin").is_empty());
}

// ═══════════════════════════════════════════════════════════════════
// History & currency
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn portfolio_chart_in_display_currency() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 1.0, 30000.0, d(2024, 1, 1)).unwrap();
    dash.add_entry("ethereum", 2.0, 1500.0, d(2024, 1, 1)).unwrap();

    assert_eq!(dash.refresh_history().await.unwrap(), 2);
    let usd: Vec<f64> = dash.portfolio_chart().iter().map(|p| p.value).collect();
    // bitcoin 41000/42000/43000 + 2 × ethereum 3000/4000/5000
    assert_eq!(usd, vec![47000.0, 50000.0, 53000.0]);

    dash.refresh_exchange_rates().await.unwrap();
    dash.set_currency("eur").unwrap();
    assert_eq!(dash.exchange_rate(), 0.5);

    let chart = dash.portfolio_chart();
    assert_eq!(chart[0].date, d(2024, 1, 1));
    assert_eq!(chart[0].value, 23500.0);
    assert_eq!(chart[2].value, 26500.0);
}

#[tokio::test]
async fn currency_switch_converts_valuation() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 1.0, 40000.0, d(2024, 1, 1)).unwrap();
    dash.refresh_prices().await.unwrap();
    dash.set_exchange_rates(HashMap::from([("PLN".to_string(), 4.0)]));
    dash.set_currency("PLN").unwrap();

    let v = dash.valuation();
    assert_eq!(v.currency, "PLN");
    assert_eq!(v.exchange_rate, 4.0);
    assert_eq!(v.total_value, 200000.0);
    assert_eq!(v.total_invested, 160000.0);
    assert_eq!(v.total_return_pct, 25.0);

    assert!(dash.set_currency("zloty").is_err());
    assert_eq!(dash.currency().selected, "PLN");
}

// ═══════════════════════════════════════════════════════════════════
// refresh_all
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn refresh_all_success() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 1.0, 40000.0, d(2024, 1, 1)).unwrap();
    dash.add_alert("solana", 100.0).unwrap();

    let report = dash.refresh_all().await;
    assert!(report.is_success());
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].coin, "solana");
    assert_eq!(dash.listings().len(), 3);
    assert_eq!(dash.market().history("bitcoin").len(), 3);
    assert!(dash.currency().rates.contains_key("EUR"));
}

#[tokio::test]
async fn refresh_all_collects_failures_and_keeps_going() {
    let market = MockMarket {
        fail_history: true,
        ..MockMarket::new()
    };
    let mut dash = dashboard_with(market, true);
    dash.add_entry("bitcoin", 1.0, 40000.0, d(2024, 1, 1)).unwrap();
    dash.add_alert("bitcoin", 45000.0).unwrap();

    let report = dash.refresh_all().await;
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(CoreError::is_fetch_failure));
    // Prices still arrived and the alert still fired.
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(dash.live_price("bitcoin").unwrap(), 50000.0);
}

// ═══════════════════════════════════════════════════════════════════
// Export
// ═══════════════════════════════════════════════════════════════════

#[test]
fn to_json_round_trips_state() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 1.0, 40000.0, d(2024, 1, 1)).unwrap();
    dash.watch("ethereum");
    dash.add_alert("bitcoin", 60000.0).unwrap();

    let json = dash.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["portfolio"]["entries"][0]["coin"], "bitcoin");
    assert_eq!(value["portfolio"]["transactions"][0]["action"], "Added");
    assert_eq!(value["watchlist"]["items"][0], "ethereum");
    assert_eq!(value["alerts"]["alerts"][0]["threshold"], 60000.0);
    assert_eq!(value["currency"]["selected"], "USD");
}

#[test]
fn history_applied_externally_feeds_chart() {
    let mut dash = dashboard();
    dash.add_entry("bitcoin", 2.0, 1.0, d(2024, 1, 1)).unwrap();
    let mut p = at(2024, 3, 1);
    p.price = 10.0;
    dash.apply_history("bitcoin", vec![p]);
    let chart = dash.portfolio_chart();
    assert_eq!(chart.len(), 1);
    assert_eq!(chart[0].date, d(2024, 3, 1));
    assert_eq!(chart[0].value, 20.0);
}
