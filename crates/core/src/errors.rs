use thiserror::Error;

/// Unified error type for the entire crypto-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Nothing here is fatal: a failed fetch or a missing price degrades the
/// computed numbers, it never halts the dashboard.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig {
        key: String,
        message: String,
    },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Portfolio entry not found: {0}")]
    EntryNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    #[error("Price not available for {coin}")]
    PriceNotAvailable { coin: String },
}

impl CoreError {
    /// `true` for edit/remove calls that referenced an absent id.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::EntryNotFound(_) | CoreError::AlertNotFound(_))
    }

    /// `true` when the external data source failed (network, HTTP status, bad payload).
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::Api { .. } | CoreError::Deserialization(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters: request URLs may carry ids and keys.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
