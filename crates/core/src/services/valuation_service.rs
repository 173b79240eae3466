use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::models::analytics::{EntryValuation, PortfolioValuation};
use crate::models::chart::ChartDataPoint;
use crate::models::portfolio::Portfolio;
use crate::models::price::PricePoint;

/// Derives portfolio figures from the entries and the latest market data.
///
/// Every method is a pure function of its inputs and is meant to be re-run
/// in full whenever entries or fetched prices change.
///
/// Missing data never fails a computation: an entry without a live price
/// is valued at 0 (and listed in `unpriced_coins`), an entry without a
/// price history contributes nothing to the chart.
///
/// `rate` is the USD → display currency multiplier and is applied to every
/// monetary figure, cost basis included, so profit/loss is never a mix of
/// currencies.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value every entry and the portfolio as a whole.
    pub fn value_portfolio(
        &self,
        portfolio: &Portfolio,
        prices: &HashMap<String, f64>,
        currency: &str,
        rate: f64,
    ) -> PortfolioValuation {
        let mut entries = Vec::with_capacity(portfolio.entries.len());
        let mut unpriced_coins: Vec<String> = Vec::new();
        let mut total_value = 0.0;
        let mut total_invested = 0.0;

        for entry in &portfolio.entries {
            let current_price = prices.get(&entry.coin).copied();
            if current_price.is_none() && !unpriced_coins.contains(&entry.coin) {
                unpriced_coins.push(entry.coin.clone());
            }

            let price_usd = current_price.unwrap_or(0.0);
            let value = price_usd * entry.units * rate;
            let invested = entry.invested() * rate;
            let profit_loss = (price_usd - entry.purchase_price) * entry.units * rate;

            total_value += value;
            total_invested += invested;

            entries.push(EntryValuation {
                entry_id: entry.id,
                coin: entry.coin.clone(),
                units: entry.units,
                purchase_price: entry.purchase_price * rate,
                current_price: current_price.map(|p| p * rate),
                total_value: value,
                invested,
                profit_loss,
                return_pct: percent(profit_loss, invested),
                allocation_pct: 0.0, // filled below
            });
        }

        for entry in &mut entries {
            entry.allocation_pct = percent(entry.total_value, total_value);
        }

        let total_profit_loss = total_value - total_invested;

        PortfolioValuation {
            currency: currency.to_string(),
            exchange_rate: rate,
            total_value,
            total_invested,
            total_profit_loss,
            total_return_pct: percent(total_profit_loss, total_invested),
            unpriced_coins,
            entries,
        }
    }

    /// Total portfolio value per calendar day, oldest day first.
    ///
    /// Each entry contributes `closing price of the day × units` for every
    /// day its coin's series covers; contributions landing on the same day
    /// are summed.
    ///
    /// Intraday points are not summed: a series with several points on one
    /// day counts only the last of them (see `daily_closes`), so a finer
    /// history window does not inflate that day's total.
    pub fn aggregate_history(
        &self,
        portfolio: &Portfolio,
        history: &HashMap<String, Vec<PricePoint>>,
        rate: f64,
    ) -> Vec<ChartDataPoint> {
        let mut closes_by_coin: HashMap<&str, BTreeMap<NaiveDate, f64>> = HashMap::new();
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for entry in &portfolio.entries {
            let Some(series) = history.get(&entry.coin) else {
                continue;
            };
            let closes = closes_by_coin
                .entry(entry.coin.as_str())
                .or_insert_with(|| Self::daily_closes(series));

            for (date, price) in closes.iter() {
                *totals.entry(*date).or_insert(0.0) += price * entry.units * rate;
            }
        }

        totals
            .into_iter()
            .map(|(date, value)| ChartDataPoint { date, value })
            .collect()
    }

    /// Last observed price of each UTC day in `points`.
    pub fn daily_closes(points: &[PricePoint]) -> BTreeMap<NaiveDate, f64> {
        let mut latest: BTreeMap<NaiveDate, &PricePoint> = BTreeMap::new();
        for point in points {
            let slot = latest.entry(point.date()).or_insert(point);
            if point.timestamp >= slot.timestamp {
                *slot = point;
            }
        }
        latest.into_iter().map(|(d, p)| (d, p.price)).collect()
    }

    /// A single coin's series converted to the display currency.
    pub fn coin_series(&self, points: &[PricePoint], rate: f64) -> Vec<PricePoint> {
        points
            .iter()
            .map(|p| PricePoint::new(p.timestamp, p.price * rate))
            .collect()
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
