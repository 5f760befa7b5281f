//! Schema and framing constants for the TWSE data feeds.

/// Canonical column order of a persisted history snapshot.
///
/// A file whose header is not exactly this set (order aside) is treated as
/// unusable and discarded on load.
pub const HISTORY_COLUMNS: &[&str] = &["date", "volume", "open", "high", "low", "close", "change"];

/// Leading non-data lines in the monthly report body.
pub const TWSE_HEADER_LINES: usize = 2;

/// Trailing summary lines in the monthly report body.
pub const TWSE_FOOTER_LINES: usize = 6;

/// Offset between the ROC calendar used by TWSE date fields and the
/// Gregorian year (`113/05/20` is 2024-05-20).
pub const ROC_YEAR_OFFSET: i32 = 1911;

/// Listing page for exchange-listed securities (strMode=2).
pub const TWSE_LISTING_URL: &str = "http://isin.twse.com.tw/isin/C_public.jsp?strMode=2";

/// CFI code identifying common stock on the listing page.
pub const CFI_COMMON_STOCK: &str = "ESVUFR";

/// CFI codes identifying the two ETF sub-types kept by the listing filter.
pub const CFI_ETF_CODES: &[&str] = &["CEOGEU", "CEOGDU"];

/// Moving-average windows applied by `IndicatorFrame::standard`.
pub const DEFAULT_SMA_WINDOWS: &[usize] = &[5, 10, 20, 60];

/// Default Bollinger band window.
pub const DEFAULT_BBAND_WINDOW: usize = 22;

/// Trailing window for the stochastic oscillator's raw value.
pub const KD_RSV_WINDOW: usize = 9;
