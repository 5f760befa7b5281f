//! Session-scoped client for the TWSE per-symbol daily report.

use std::time::Duration;

use chrono::NaiveDate;
use isahc::cookies::CookieJar;
use isahc::{config::Configurable, prelude::*, HttpClient};
use serde::Deserialize;
use tracing::debug;

use crate::constants::{TWSE_FOOTER_LINES, TWSE_HEADER_LINES};
use crate::error::{AppError, Result};

/// One raw row of the monthly report body, every field as reported: the
/// date is in ROC-era form, volume and turnover are thousands-separated
/// text, and the row carries a note column plus a trailing empty field.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDailyRow {
    pub date: String,
    pub volume: String,
    pub turnover: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub change: String,
    pub note: String,
    pub blank: String,
}

/// Blocking client for the exchange's daily-report endpoint.
///
/// Holds immutable endpoint configuration only; each fetch acquires its
/// own session so cookie state never leaks between calls.
pub struct TwseClient {
    report_url: String,
    prime_url: String,
    timeout: Duration,
}

impl Default for TwseClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TwseClient {
    pub fn new() -> Self {
        Self {
            report_url: "http://www.twse.com.tw/exchangeReport/STOCK_DAY".to_string(),
            prime_url: "http://mis.twse.com.tw/stock/index.jsp".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Fetch the daily report covering `anchor`'s month.
    ///
    /// The endpoint requires a primed session: a fresh cookie jar is
    /// created per call, the priming request and the data request share
    /// it, and the session is dropped on return.
    ///
    /// `Ok(None)` means the month has no data (future month, pre-listing
    /// period); callers skip it. Transport failures are hard errors.
    pub fn fetch_month(&self, symbol: &str, anchor: NaiveDate) -> Result<Option<Vec<RawDailyRow>>> {
        let client = HttpClient::builder()
            .timeout(self.timeout)
            .cookie_jar(CookieJar::new())
            .build()?;

        let prime = isahc::Request::builder()
            .uri(&self.prime_url)
            .header("Accept-Language", "zh-TW")
            .body(())
            .map_err(|e| AppError::Network(format!("request build error: {}", e)))?;
        client.send(prime)?;

        let url = format!(
            "{}?response=csv&date={}&stockNo={}",
            self.report_url,
            anchor.format("%Y%m%d"),
            symbol
        );
        debug!("query_url={}", url);

        let mut response = client.get(&url)?;
        if !response.status().is_success() {
            debug!(
                "no data for {} in {} (status {})",
                symbol,
                anchor.format("%Y-%m"),
                response.status()
            );
            return Ok(None);
        }

        let body = response.text()?;
        parse_report_body(&body)
    }
}

/// Strip the report's framing (2 header lines, 6 trailing summary lines)
/// and parse the remaining comma-separated data lines.
pub(crate) fn parse_report_body(body: &str) -> Result<Option<Vec<RawDailyRow>>> {
    let lines: Vec<&str> = body.split("\r\n").collect();
    if lines.len() <= TWSE_HEADER_LINES + TWSE_FOOTER_LINES {
        return Ok(None);
    }
    let data = lines[TWSE_HEADER_LINES..lines.len() - TWSE_FOOTER_LINES]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    if data.is_empty() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(data.as_bytes());
    let mut rows = Vec::new();
    for record in reader.deserialize::<RawDailyRow>() {
        rows.push(record?);
    }
    if rows.is_empty() {
        Ok(None)
    } else {
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> String {
        let mut lines = vec![
            "\"113年05月 2330 台積電 各日成交資訊\"".to_string(),
            "\"日期\",\"成交股數\",\"成交金額\",\"開盤價\",\"最高價\",\"最低價\",\"收盤價\",\"漲跌價差\",\"成交筆數\",".to_string(),
        ];
        lines.push("\"113/05/02\",\"12,345,678\",\"10,522,097,400\",\"850.00\",\"857.00\",\"847.00\",\"853.00\",\"+3.00\",\"25,352\",".to_string());
        lines.push("\"113/05/03\",\"23,456,789\",\"19,988,210,500\",\"855.00\",\"860.00\",\"851.00\",\"858.00\",\"+5.00\",\"31,004\",".to_string());
        for _ in 0..6 {
            lines.push("\"說明:\"".to_string());
        }
        lines.join("\r\n")
    }

    #[test]
    fn test_parse_report_body() {
        let rows = parse_report_body(&sample_body()).unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "113/05/02");
        assert_eq!(rows[0].volume, "12,345,678");
        assert_eq!(rows[0].close, "853.00");
        assert_eq!(rows[1].change, "+5.00");
        assert_eq!(rows[1].blank, "");
    }

    #[test]
    fn test_parse_report_body_too_short() {
        // A body with nothing beyond the framing is a valid empty month.
        let body = vec!["a"; 8].join("\r\n");
        assert!(parse_report_body(&body).unwrap().is_none());
    }
}
