pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use models::{
    alert::{Alert, AlertNotification},
    analytics::PortfolioValuation,
    chart::ChartDataPoint,
    coin::{CoinDetail, CoinSnapshot},
    currency::CurrencyPreference,
    market::{MarketSnapshot, RefreshReport},
    portfolio::{PortfolioEntry, Transaction},
    price::PricePoint,
    settings::Settings,
    state::DashboardState,
};
use providers::{
    coingecko::CoinGeckoProvider,
    frankfurter::FrankfurterProvider,
    traits::{ExchangeRateProvider, MarketDataProvider},
};
use services::{
    alert_service::AlertService, currency_service::CurrencyService,
    market_service::MarketService, portfolio_service::PortfolioService,
    valuation_service::ValuationService, watchlist_service::WatchlistService,
};
use std::collections::HashMap;
use tracing::info;

use chrono::NaiveDate;
use errors::CoreError;
use uuid::Uuid;

/// Main entry point for the Crypto Dashboard core library.
///
/// Owns the whole session state (portfolio, alerts, watchlist, currency,
/// fetched market data) and the services operating on it. Every change
/// goes through one of the named methods below; derived figures are
/// recomputed on demand from the current state.
#[must_use]
pub struct CryptoDashboard {
    settings: Settings,
    state: DashboardState,
    portfolio_service: PortfolioService,
    alert_service: AlertService,
    watchlist_service: WatchlistService,
    valuation_service: ValuationService,
    currency_service: CurrencyService,
    market_service: MarketService,
}

impl std::fmt::Debug for CryptoDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoDashboard")
            .field("entries", &self.state.portfolio.entries.len())
            .field("transactions", &self.state.portfolio.transactions.len())
            .field("alerts", &self.state.alerts.alerts.len())
            .field("watchlist", &self.state.watchlist.len())
            .field("currency", &self.state.currency.selected)
            .field("provider", &self.market_service.provider_name())
            .finish()
    }
}

impl CryptoDashboard {
    /// Create a dashboard backed by the public CoinGecko and Frankfurter APIs.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        let mut settings = settings;
        settings.normalize();
        settings.validate()?;
        let market = CoinGeckoProvider::from_settings(&settings);
        let rates = FrankfurterProvider::from_settings(&settings);
        Self::with_providers(settings, Box::new(market), Box::new(rates))
    }

    /// Create a dashboard from environment configuration (`DASHBOARD_*`).
    pub fn from_env() -> Result<Self, CoreError> {
        Self::new(Settings::from_env()?)
    }

    /// Create a dashboard with custom data sources (alternate APIs, test doubles).
    pub fn with_providers(
        settings: Settings,
        market: Box<dyn MarketDataProvider>,
        rates: Box<dyn ExchangeRateProvider>,
    ) -> Result<Self, CoreError> {
        let mut settings = settings;
        settings.normalize();
        settings.validate()?;

        let mut state = DashboardState::default();
        let currency_service = CurrencyService::new();
        currency_service.set_currency(&mut state.currency, &settings.default_currency)?;

        info!(
            provider = market.name(),
            rates_provider = rates.name(),
            currency = %state.currency.selected,
            "dashboard created"
        );

        Ok(Self {
            settings,
            state,
            portfolio_service: PortfolioService::new(),
            alert_service: AlertService::new(),
            watchlist_service: WatchlistService::new(),
            valuation_service: ValuationService::new(),
            currency_service,
            market_service: MarketService::new(market, rates),
        })
    }

    /// Active configuration.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read-only view of the whole session state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Record a purchase. Returns the new entry's id.
    pub fn add_entry(
        &mut self,
        coin: &str,
        units: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        self.portfolio_service.add_entry(
            &mut self.state.portfolio,
            coin,
            units,
            purchase_price,
            purchase_date,
        )
    }

    /// Replace an existing entry (matched by `entry.id`).
    pub fn edit_entry(&mut self, entry: PortfolioEntry) -> Result<(), CoreError> {
        self.portfolio_service
            .edit_entry(&mut self.state.portfolio, entry)
    }

    /// Remove an entry. Returns the removed entry.
    pub fn remove_entry(&mut self, entry_id: Uuid) -> Result<PortfolioEntry, CoreError> {
        self.portfolio_service
            .remove_entry(&mut self.state.portfolio, entry_id)
    }

    #[must_use]
    pub fn get_entry(&self, entry_id: Uuid) -> Option<&PortfolioEntry> {
        self.portfolio_service
            .get_entry(&self.state.portfolio, entry_id)
    }

    /// All entries, in the order they were added.
    #[must_use]
    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.state.portfolio.entries
    }

    #[must_use]
    pub fn entries_for_coin(&self, coin: &str) -> Vec<&PortfolioEntry> {
        self.portfolio_service
            .entries_for_coin(&self.state.portfolio, coin)
    }

    /// Distinct coins held, first-seen order.
    #[must_use]
    pub fn held_coins(&self) -> Vec<String> {
        self.portfolio_service.held_coins(&self.state.portfolio)
    }

    /// Transaction log, oldest first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.state.portfolio.transactions
    }

    #[must_use]
    pub fn transactions_for_coin(&self, coin: &str) -> Vec<&Transaction> {
        self.portfolio_service
            .transactions_for_coin(&self.state.portfolio, coin)
    }

    // ── Alerts ──────────────────────────────────────────────────────

    /// Create a one-shot alert on `coin` at `threshold` USD.
    pub fn add_alert(&mut self, coin: &str, threshold: f64) -> Result<Uuid, CoreError> {
        self.alert_service
            .add_alert(&mut self.state.alerts, coin, threshold)
    }

    /// Cancel an alert before it fires.
    pub fn remove_alert(&mut self, alert_id: Uuid) -> Result<Alert, CoreError> {
        self.alert_service
            .remove_alert(&mut self.state.alerts, alert_id)
    }

    /// Active alerts, insertion order.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.state.alerts.alerts
    }

    #[must_use]
    pub fn alerts_for_coin(&self, coin: &str) -> Vec<&Alert> {
        self.alert_service.alerts_for_coin(&self.state.alerts, coin)
    }

    /// Check alerts against the stored live prices. Fired alerts are removed.
    pub fn evaluate_alerts(&mut self) -> Vec<AlertNotification> {
        self.alert_service
            .evaluate(&mut self.state.alerts, &self.state.market.prices)
    }

    // ── Watchlist ───────────────────────────────────────────────────

    /// Returns `false` if the coin was already watched.
    pub fn watch(&mut self, coin: &str) -> bool {
        self.watchlist_service.add(&mut self.state.watchlist, coin)
    }

    /// Returns `false` if the coin was not watched.
    pub fn unwatch(&mut self, coin: &str) -> bool {
        self.watchlist_service
            .remove(&mut self.state.watchlist, coin)
    }

    /// Flip membership; returns whether the coin is watched afterwards.
    pub fn toggle_watch(&mut self, coin: &str) -> bool {
        self.watchlist_service
            .toggle(&mut self.state.watchlist, coin)
    }

    #[must_use]
    pub fn is_watched(&self, coin: &str) -> bool {
        self.state.watchlist.contains(coin)
    }

    #[must_use]
    pub fn watchlist(&self) -> &[String] {
        &self.state.watchlist.items
    }

    /// Stored listings restricted to watched coins.
    #[must_use]
    pub fn watchlist_listings(&self) -> Vec<&CoinSnapshot> {
        self.watchlist_service
            .filter_listings(&self.state.watchlist, &self.state.market.listings)
    }

    // ── Currency ────────────────────────────────────────────────────

    /// Set the display currency (e.g., "EUR"). Must be 3 ASCII letters.
    pub fn set_currency(&mut self, code: &str) -> Result<(), CoreError> {
        self.currency_service
            .set_currency(&mut self.state.currency, code)
    }

    #[must_use]
    pub fn currency(&self) -> &CurrencyPreference {
        &self.state.currency
    }

    /// Replace cached exchange rates (units per 1 USD) with an externally fetched set.
    pub fn set_exchange_rates(&mut self, rates: HashMap<String, f64>) {
        self.currency_service
            .replace_rates(&mut self.state.currency, rates);
    }

    /// USD → display currency multiplier (1.0 when no rate is loaded).
    #[must_use]
    pub fn exchange_rate(&self) -> f64 {
        self.currency_service.rate(&self.state.currency)
    }

    // ── Market data ─────────────────────────────────────────────────

    /// Fetch the top coins (`settings.listing_limit`) into the snapshot.
    pub async fn refresh_listings(&mut self) -> Result<&[CoinSnapshot], CoreError> {
        self.market_service
            .refresh_listings(&mut self.state.market, self.settings.listing_limit)
            .await?;
        Ok(&self.state.market.listings)
    }

    /// Fetch detail for one coin.
    pub async fn coin_detail(&self, id: &str) -> Result<CoinDetail, CoreError> {
        self.market_service.coin_detail(id).await
    }

    /// Fetch live prices for every held or alerted coin, then evaluate alerts.
    /// Returns the alerts that fired.
    pub async fn refresh_prices(&mut self) -> Result<Vec<AlertNotification>, CoreError> {
        let coins = self.priced_coins();
        self.market_service
            .refresh_prices(&mut self.state.market, &coins)
            .await?;
        Ok(self.evaluate_alerts())
    }

    /// Fetch `settings.history_days` of history for every held coin.
    pub async fn refresh_history(&mut self) -> Result<usize, CoreError> {
        let coins = self.held_coins();
        self.market_service
            .refresh_history(&mut self.state.market, &coins, self.settings.history_days)
            .await
    }

    /// Fetch `days` of history for a single coin (coin detail chart).
    pub async fn refresh_coin_history(&mut self, coin: &str, days: u32) -> Result<(), CoreError> {
        let coins = [coin.trim().to_string()];
        self.market_service
            .refresh_history(&mut self.state.market, &coins, days)
            .await?;
        Ok(())
    }

    /// Fetch the latest exchange rates and replace the cached ones.
    pub async fn refresh_exchange_rates(&mut self) -> Result<(), CoreError> {
        let rates = self.market_service.fetch_exchange_rates().await?;
        self.currency_service
            .replace_rates(&mut self.state.currency, rates);
        Ok(())
    }

    /// Refresh listings, prices, history and rates. Each query runs even if
    /// an earlier one failed; failures are collected in the report.
    pub async fn refresh_all(&mut self) -> RefreshReport {
        let mut report = RefreshReport::default();

        if let Err(e) = self.refresh_listings().await {
            report.failures.push(e);
        }
        match self.refresh_prices().await {
            Ok(fired) => report.notifications = fired,
            Err(e) => report.failures.push(e),
        }
        if let Err(e) = self.refresh_history().await {
            report.failures.push(e);
        }
        if let Err(e) = self.refresh_exchange_rates().await {
            report.failures.push(e);
        }

        report
    }

    /// Store live prices obtained elsewhere, then evaluate alerts.
    /// Prices that are not finite and non-negative are ignored.
    pub fn apply_prices(&mut self, prices: HashMap<String, f64>) -> Vec<AlertNotification> {
        let valid: HashMap<String, f64> = prices
            .into_iter()
            .filter(|(_, p)| p.is_finite() && *p >= 0.0)
            .collect();
        self.state.market.set_prices(&valid);
        self.evaluate_alerts()
    }

    /// Store a price history obtained elsewhere.
    pub fn apply_history(&mut self, coin: &str, points: Vec<PricePoint>) {
        self.state.market.set_history(coin, points);
    }

    #[must_use]
    pub fn market(&self) -> &MarketSnapshot {
        &self.state.market
    }

    /// Stored listings, API order.
    #[must_use]
    pub fn listings(&self) -> &[CoinSnapshot] {
        &self.state.market.listings
    }

    /// Stored listings whose name or symbol contains `query` (case-insensitive).
    #[must_use]
    pub fn search_listings(&self, query: &str) -> Vec<&CoinSnapshot> {
        self.state.market.search_listings(query)
    }

    /// Live USD price of a coin.
    pub fn live_price(&self, coin: &str) -> Result<f64, CoreError> {
        self.state
            .market
            .price(coin)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                coin: coin.to_string(),
            })
    }

    // ── Valuation & charts ──────────────────────────────────────────

    /// Current valuation of the portfolio in the display currency.
    #[must_use]
    pub fn valuation(&self) -> PortfolioValuation {
        self.valuation_service.value_portfolio(
            &self.state.portfolio,
            &self.state.market.prices,
            &self.state.currency.selected,
            self.exchange_rate(),
        )
    }

    /// Daily total portfolio value over the stored history, oldest first.
    #[must_use]
    pub fn portfolio_chart(&self) -> Vec<ChartDataPoint> {
        self.valuation_service.aggregate_history(
            &self.state.portfolio,
            &self.state.market.history,
            self.exchange_rate(),
        )
    }

    /// Stored price history of one coin in the display currency.
    #[must_use]
    pub fn coin_chart(&self, coin: &str) -> Vec<PricePoint> {
        self.valuation_service
            .coin_series(self.state.market.history(coin), self.exchange_rate())
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Serialize the whole session state as pretty JSON (for debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.state)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize dashboard state: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Held coins followed by alerted coins not already held.
    fn priced_coins(&self) -> Vec<String> {
        let mut coins = self.held_coins();
        for coin in self.alert_service.watched_coins(&self.state.alerts) {
            if !coins.contains(&coin) {
                coins.push(coin);
            }
        }
        coins
    }
}
