use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::{Portfolio, PortfolioEntry, Transaction, TransactionAction};

/// Manages portfolio entries and appends one transaction per successful change.
///
/// Pure business logic, no I/O, no API calls. A failed call (bad input or
/// unknown id) leaves both the entries and the transaction log untouched.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Record a new lot. Returns the id assigned to it.
    pub fn add_entry(
        &self,
        portfolio: &mut Portfolio,
        coin: &str,
        units: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        let entry = PortfolioEntry::new(coin.trim(), units, purchase_price, purchase_date);
        Self::validate_entry(&entry)?;

        // Ids are random v4s; regenerate on the (theoretical) collision.
        let mut entry = entry;
        while portfolio.entries.iter().any(|e| e.id == entry.id) {
            entry.id = Uuid::new_v4();
        }

        let id = entry.id;
        portfolio
            .transactions
            .push(Transaction::record(TransactionAction::Added, &entry));
        debug!(%id, coin = %entry.coin, "portfolio entry added");
        portfolio.entries.push(entry);
        Ok(id)
    }

    /// Replace the entry with the same id, keeping its position.
    pub fn edit_entry(
        &self,
        portfolio: &mut Portfolio,
        entry: PortfolioEntry,
    ) -> Result<(), CoreError> {
        let idx = portfolio
            .entries
            .iter()
            .position(|e| e.id == entry.id)
            .ok_or_else(|| CoreError::EntryNotFound(entry.id.to_string()))?;

        let mut entry = entry;
        entry.coin = entry.coin.trim().to_string();
        Self::validate_entry(&entry)?;

        portfolio
            .transactions
            .push(Transaction::record(TransactionAction::Edited, &entry));
        debug!(id = %entry.id, coin = %entry.coin, "portfolio entry edited");
        portfolio.entries[idx] = entry;
        Ok(())
    }

    /// Remove an entry by id. Returns the removed entry.
    pub fn remove_entry(
        &self,
        portfolio: &mut Portfolio,
        entry_id: Uuid,
    ) -> Result<PortfolioEntry, CoreError> {
        let idx = portfolio
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;

        let removed = portfolio.entries.remove(idx);
        portfolio
            .transactions
            .push(Transaction::record(TransactionAction::Removed, &removed));
        debug!(id = %entry_id, coin = %removed.coin, "portfolio entry removed");
        Ok(removed)
    }

    pub fn get_entry<'a>(&self, portfolio: &'a Portfolio, entry_id: Uuid) -> Option<&'a PortfolioEntry> {
        portfolio.entries.iter().find(|e| e.id == entry_id)
    }

    /// Entries for one coin, in insertion order.
    pub fn entries_for_coin<'a>(&self, portfolio: &'a Portfolio, coin: &str) -> Vec<&'a PortfolioEntry> {
        portfolio.entries.iter().filter(|e| e.coin == coin).collect()
    }

    /// Distinct coins held, in the order they first appear.
    pub fn held_coins(&self, portfolio: &Portfolio) -> Vec<String> {
        let mut coins: Vec<String> = Vec::new();
        for entry in &portfolio.entries {
            if !coins.contains(&entry.coin) {
                coins.push(entry.coin.clone());
            }
        }
        coins
    }

    /// Transactions touching one coin, oldest first.
    pub fn transactions_for_coin<'a>(&self, portfolio: &'a Portfolio, coin: &str) -> Vec<&'a Transaction> {
        portfolio
            .transactions
            .iter()
            .filter(|t| t.coin == coin)
            .collect()
    }

    /// Rules:
    /// - coin must be non-empty
    /// - units must be finite and positive
    /// - purchase price must be finite and non-negative
    fn validate_entry(entry: &PortfolioEntry) -> Result<(), CoreError> {
        if entry.coin.is_empty() {
            return Err(CoreError::ValidationError("Coin must not be empty".into()));
        }
        if !entry.units.is_finite() || entry.units <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Units must be positive, got {}",
                entry.units
            )));
        }
        if !entry.purchase_price.is_finite() || entry.purchase_price < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Purchase price must be non-negative, got {}",
                entry.purchase_price
            )));
        }
        Ok(())
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
