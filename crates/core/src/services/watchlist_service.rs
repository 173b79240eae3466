use crate::models::coin::CoinSnapshot;
use crate::models::watchlist::Watchlist;

/// Set semantics over the user's watchlist. Every operation is idempotent.
pub struct WatchlistService;

impl WatchlistService {
    pub fn new() -> Self {
        Self
    }

    /// Add a coin. Returns `false` if it was already present.
    pub fn add(&self, watchlist: &mut Watchlist, coin: &str) -> bool {
        if watchlist.contains(coin) {
            return false;
        }
        watchlist.items.push(coin.to_string());
        true
    }

    /// Remove a coin. Returns `false` if it was not present.
    pub fn remove(&self, watchlist: &mut Watchlist, coin: &str) -> bool {
        let before = watchlist.items.len();
        watchlist.items.retain(|c| c != coin);
        watchlist.items.len() != before
    }

    /// Flip membership. Returns whether the coin is watched afterwards.
    pub fn toggle(&self, watchlist: &mut Watchlist, coin: &str) -> bool {
        if self.remove(watchlist, coin) {
            false
        } else {
            self.add(watchlist, coin)
        }
    }

    /// Keep only watched coins, preserving listing order.
    pub fn filter_listings<'a>(&self, watchlist: &Watchlist, listings: &'a [CoinSnapshot]) -> Vec<&'a CoinSnapshot> {
        listings
            .iter()
            .filter(|coin| watchlist.contains(&coin.id))
            .collect()
    }
}

impl Default for WatchlistService {
    fn default() -> Self {
        Self::new()
    }
}
