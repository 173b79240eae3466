use serde::{Deserialize, Serialize};

/// Coin ids the user has flagged, in the order they were added. No duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub items: Vec<String>,
}

impl Watchlist {
    #[must_use]
    pub fn contains(&self, coin: &str) -> bool {
        self.items.iter().any(|c| c == coin)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
