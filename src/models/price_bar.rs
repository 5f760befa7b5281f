use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of a single symbol.
///
/// Field order is the canonical column order of the persisted snapshot
/// (`date,volume,open,high,low,close,change`). The exchange reports dates
/// in the ROC calendar and volume as thousands-separated text; both are
/// converted on ingestion, so a bar always holds canonical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    /// Shares traded.
    pub volume: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Day-over-day close change, signed.
    pub change: f64,
}
