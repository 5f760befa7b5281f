//! Security listing sources: the TWSE ISIN page, a CSV URL, or a local
//! CSV file. All three return the same `ListedSecurity` records.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use isahc::{config::Configurable, prelude::*, HttpClient};
use tracing::debug;

use crate::constants::{CFI_COMMON_STOCK, CFI_ETF_CODES};
use crate::error::{AppError, Result};
use crate::models::ListedSecurity;

fn http_client() -> Result<HttpClient> {
    Ok(HttpClient::builder()
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Fetch the ISIN listing page and extract common stocks and ETFs.
///
/// The page is served as Big5-encoded HTML with one flat table.
pub fn from_twse(url: &str) -> Result<Vec<ListedSecurity>> {
    debug!("fetching listing page {}", url);
    let mut response = http_client()?.get(url)?;
    if !response.status().is_success() {
        return Err(AppError::Network(format!(
            "listing page returned {}",
            response.status()
        )));
    }
    let bytes = response.bytes()?;
    let (text, _, _) = encoding_rs::BIG5.decode(&bytes);
    Ok(parse_listing_page(&text))
}

/// Fetch a CSV-hosted listing from a URL.
pub fn from_csv_url(url: &str) -> Result<Vec<ListedSecurity>> {
    debug!("fetching listing csv {}", url);
    let mut response = http_client()?.get(url)?;
    if !response.status().is_success() {
        return Err(AppError::Network(format!(
            "listing url returned {}",
            response.status()
        )));
    }
    let body = response.text()?;
    read_csv(body.as_bytes())
}

/// Read a listing from a local CSV file.
pub fn from_csv_file(path: &Path) -> Result<Vec<ListedSecurity>> {
    read_csv(File::open(path)?)
}

/// Write a listing as CSV in the `id,name,type,class,begin_date` schema.
pub fn write_csv(securities: &[ListedSecurity], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for security in securities {
        writer.serialize(security)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<R: Read>(reader: R) -> Result<Vec<ListedSecurity>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut securities = Vec::new();
    for record in csv_reader.deserialize::<ListedSecurity>() {
        securities.push(record?);
    }
    Ok(securities)
}

/// Extract listing rows from the ISIN page markup.
///
/// Data rows are `<tr>` elements with at least six `<td>` cells; only
/// rows whose CFI code marks common stock or one of the two ETF sub-types
/// are kept. The first cell holds `code　name` joined by a full-width
/// space; the `class` cell is rewritten to `ETF` for the ETF codes.
fn parse_listing_page(html: &str) -> Vec<ListedSecurity> {
    let mut securities = Vec::new();
    for row in extract_elements(html, "tr") {
        let cells: Vec<String> = extract_elements(&row, "td")
            .iter()
            .map(|cell| strip_tags(cell))
            .collect();
        if cells.len() < 6 {
            continue;
        }

        let cfi = cells[5].trim();
        let is_etf = CFI_ETF_CODES.contains(&cfi);
        if cfi != CFI_COMMON_STOCK && !is_etf {
            continue;
        }

        let Some((id, name)) = cells[0].split_once('\u{3000}') else {
            continue;
        };

        securities.push(ListedSecurity {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            kind: cells[3].trim().to_string(),
            class: if is_etf {
                "ETF".to_string()
            } else {
                cells[4].trim().to_string()
            },
            begin_date: cells[2].trim().to_string(),
        });
    }
    securities
}

/// Collect the inner content of every `<tag ...>...</tag>` pair.
///
/// Tag matching is ASCII case-insensitive; the ISIN page uses flat,
/// non-nested table markup, so a linear scan is sufficient.
fn extract_elements(html: &str, tag: &str) -> Vec<String> {
    // ASCII-only lowering keeps byte offsets valid for the original text.
    let lowered = html.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut elements = Vec::new();
    let mut pos = 0;
    while let Some(found) = lowered[pos..].find(&open) {
        let start = pos + found;
        let Some(body_offset) = lowered[start..].find('>') else {
            break;
        };
        let body_start = start + body_offset + 1;
        let Some(end_offset) = lowered[body_start..].find(&close) else {
            break;
        };
        let end = body_start + end_offset;
        elements.push(html[body_start..end].to_string());
        pos = end + close.len();
    }
    elements
}

/// Drop every `<...>` span and trim the remainder.
fn strip_tags(fragment: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = "\
<html><body><table>
<tr><td colspan=7>股票</td></tr>
<tr><td>有價證券代號及名稱</td><td>國際證券辨識號碼</td><td>上市日</td><td>市場別</td><td>產業別</td><td>CFICode</td><td>備註</td></tr>
<TR><TD>2330\u{3000}台積電</TD><TD>TW0002330008</TD><TD>1994/09/05</TD><TD>上市</TD><TD>半導體業</TD><TD>ESVUFR</TD><TD></TD></TR>
<tr><td>0050\u{3000}元大台灣50</td><td>TW0000050004</td><td>2003/06/30</td><td>上市</td><td></td><td>CEOGEU</td><td></td></tr>
<tr><td>00690\u{3000}兆豐藍籌30</td><td>TW00006900B4</td><td>2017/03/31</td><td>上市</td><td></td><td>CEOGDU</td><td></td></tr>
<tr><td>123456\u{3000}某可轉債</td><td>TW0001234560</td><td>2020/01/02</td><td>上市</td><td></td><td>DBVUFR</td><td></td></tr>
</table></body></html>";

    #[test]
    fn test_parse_listing_page_filters_by_cfi() {
        let securities = parse_listing_page(SAMPLE_PAGE);
        assert_eq!(securities.len(), 3);
        assert_eq!(securities[0].id, "2330");
        assert_eq!(securities[0].name, "台積電");
        assert_eq!(securities[0].kind, "上市");
        assert_eq!(securities[0].class, "半導體業");
        assert_eq!(securities[0].begin_date, "1994/09/05");
    }

    #[test]
    fn test_parse_listing_page_rewrites_etf_class() {
        let securities = parse_listing_page(SAMPLE_PAGE);
        assert_eq!(securities[1].id, "0050");
        assert_eq!(securities[1].class, "ETF");
        assert_eq!(securities[2].class, "ETF");
    }

    #[test]
    fn test_extract_elements_case_insensitive() {
        let elements = extract_elements("<TD>a</TD><td>b</td>", "td");
        assert_eq!(elements, vec!["a", "b"]);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags(" <b>2330</b> "), "2330");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_read_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.csv");

        let securities = vec![ListedSecurity {
            id: "2330".to_string(),
            name: "台積電".to_string(),
            kind: "上市".to_string(),
            class: "半導體業".to_string(),
            begin_date: "1994/09/05".to_string(),
        }];
        write_csv(&securities, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("id,name,type,class,begin_date"));

        let loaded = from_csv_file(&path).unwrap();
        assert_eq!(loaded, securities);
    }
}
