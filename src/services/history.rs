//! Incremental reconciliation of monthly reports into a symbol's history.
//!
//! The reconciler drives the fetcher month by month, converts raw report
//! rows to canonical bars, and merges update batches into an existing
//! history without ever producing duplicate or out-of-order dates.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use tracing::{debug, info};

use crate::constants::ROC_YEAR_OFFSET;
use crate::error::{AppError, Result};
use crate::models::{PriceBar, PriceHistory};
use crate::services::twse::{RawDailyRow, TwseClient};

pub struct HistoryReconciler {
    client: TwseClient,
}

impl HistoryReconciler {
    pub fn new(client: TwseClient) -> Self {
        Self { client }
    }

    /// Fetch and clean every calendar month of `[begin, end]` in order.
    ///
    /// `end` is clamped to today (future months cannot be fetched). Each
    /// month in the range is fetched exactly once; months the exchange
    /// reports no data for are skipped.
    pub fn build_range(&self, symbol: &str, begin: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>> {
        let end = end.min(today());
        let mut bars = Vec::new();
        for anchor in month_anchors(begin, end) {
            let Some(rows) = self.client.fetch_month(symbol, anchor)? else {
                debug!("no data for {} in {}", symbol, anchor.format("%Y-%m"));
                continue;
            };
            for row in &rows {
                bars.push(clean_row(row)?);
            }
        }
        Ok(bars)
    }

    /// Bootstrap one year of history ending today.
    pub fn build_initial(&self, symbol: &str) -> Result<PriceHistory> {
        let end = today();
        let begin = end.checked_sub_months(Months::new(12)).unwrap_or(end);
        info!("bootstrapping one year of history for {}", symbol);
        let bars = self.build_range(symbol, begin, end)?;
        Ok(PriceHistory::with_bars(symbol, bars))
    }

    /// Fetch the gap since the last persisted date and append it.
    ///
    /// Bars dated at or before the last known date are discarded before
    /// the append, so re-running with no new upstream data leaves the
    /// history unchanged. Returns the number of bars appended.
    pub fn update(&self, history: &mut PriceHistory) -> Result<usize> {
        let Some(last) = history.last_date() else {
            let fresh = self.build_initial(&history.symbol)?;
            history.bars = fresh.bars;
            return Ok(history.len());
        };

        let end = today();
        if last >= end {
            debug!("history for {} already current ({})", history.symbol, last);
            return Ok(0);
        }

        info!("updating {} from {}", history.symbol, last);
        let begin = last.checked_add_days(Days::new(1)).unwrap_or(end);
        let fetched = self.build_range(&history.symbol, begin, end)?;
        Ok(merge_new_bars(history, fetched))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fetch anchor for every calendar month of `[begin, end]`, in order.
///
/// Exactly one anchor per month: a range contained in a single month
/// yields a single anchor, and the end month is never fetched twice.
pub(crate) fn month_anchors(begin: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut anchors = Vec::new();
    if begin > end {
        return anchors;
    }
    let mut anchor = begin;
    loop {
        anchors.push(anchor);
        if (anchor.year(), anchor.month()) == (end.year(), end.month()) {
            break;
        }
        match anchor
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
        {
            Some(next) => anchor = next,
            None => break,
        }
    }
    anchors
}

/// Append the fetched bars that are newer than the existing history,
/// preserving the strictly-increasing date invariant.
pub(crate) fn merge_new_bars(history: &mut PriceHistory, mut fetched: Vec<PriceBar>) -> usize {
    if let Some(last) = history.last_date() {
        fetched.retain(|bar| {
            if bar.date <= last {
                debug!("removing duplicate date: {}", bar.date);
                false
            } else {
                true
            }
        });
    }
    fetched.sort_by_key(|bar| bar.date);
    fetched.dedup_by_key(|bar| bar.date);
    let appended = fetched.len();
    history.bars.extend(fetched);
    appended
}

/// Convert one raw report row into a canonical bar: ROC-era date to
/// Gregorian, thousands-separated volume to integer, prices and signed
/// change to floats. Turnover and note columns are dropped.
pub(crate) fn clean_row(row: &RawDailyRow) -> Result<PriceBar> {
    Ok(PriceBar {
        date: parse_roc_date(&row.date)?,
        volume: parse_volume(&row.volume)?,
        open: parse_price(&row.open)?,
        high: parse_price(&row.high)?,
        low: parse_price(&row.low)?,
        close: parse_price(&row.close)?,
        change: parse_change(&row.change)?,
    })
}

/// `113/05/20` (ROC era) -> 2024-05-20.
pub(crate) fn parse_roc_date(raw: &str) -> Result<NaiveDate> {
    let bad = || AppError::Parse(format!("bad date field: {:?}", raw));
    let mut parts = raw.trim().splitn(3, '/');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(bad());
    };
    let year: i32 = year.trim().parse().map_err(|_| bad())?;
    let month: u32 = month.trim().parse().map_err(|_| bad())?;
    let day: u32 = day.trim().parse().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(year + ROC_YEAR_OFFSET, month, day).ok_or_else(bad)
}

/// `12,345,678` -> 12345678.
pub(crate) fn parse_volume(raw: &str) -> Result<u64> {
    raw.trim()
        .replace(',', "")
        .parse()
        .map_err(|_| AppError::Parse(format!("bad volume field: {:?}", raw)))
}

pub(crate) fn parse_price(raw: &str) -> Result<f64> {
    raw.trim()
        .replace(',', "")
        .parse()
        .map_err(|_| AppError::Parse(format!("bad price field: {:?}", raw)))
}

/// Signed day-over-day change. The feed prefixes an `X` on ex-dividend
/// days; the marker is stripped before parsing.
pub(crate) fn parse_change(raw: &str) -> Result<f64> {
    raw.trim()
        .trim_start_matches('X')
        .trim()
        .parse()
        .map_err(|_| AppError::Parse(format!("bad change field: {:?}", raw)))
}
