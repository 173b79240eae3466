use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single data point for chart rendering.
///
/// The core computes these, the frontend just plots them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    /// Calendar day (UTC)
    pub date: NaiveDate,

    /// Value on that day in the display currency
    pub value: f64,
}
