//! Per-symbol CSV persistence with a strict schema gate.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::constants::HISTORY_COLUMNS;
use crate::error::Result;
use crate::models::{PriceBar, PriceHistory};

pub struct HistoryStore;

impl HistoryStore {
    /// Default snapshot location for a symbol.
    pub fn default_path(symbol: &str) -> PathBuf {
        PathBuf::from("storage").join(symbol).join("history.csv")
    }

    /// Load a persisted snapshot.
    ///
    /// `Ok(None)` when the file is missing or when its column set does not
    /// exactly match the expected schema (set equality, order ignored). A
    /// mismatched file is never repaired; the caller re-bootstraps.
    pub fn load(symbol: &str, path: &Path) -> Result<Option<PriceHistory>> {
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let found: HashSet<&str> = headers.iter().collect();
        let expected: HashSet<&str> = HISTORY_COLUMNS.iter().copied().collect();
        if found != expected {
            error!("file {} format mismatch", path.display());
            return Ok(None);
        }

        let mut bars = Vec::new();
        for record in reader.deserialize::<PriceBar>() {
            bars.push(record?);
        }
        debug!("history loaded from {}", path.display());
        Ok(Some(PriceHistory::with_bars(symbol, bars)))
    }

    /// Write a full-overwrite snapshot in canonical column order, creating
    /// parent directories as needed. No atomic-rename guarantee.
    pub fn save(history: &PriceHistory, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        for bar in &history.bars {
            writer.serialize(bar)?;
        }
        writer.flush()?;
        debug!("history saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            volume: 12345678,
            open: 850.0,
            high: 857.0,
            low: 847.0,
            close: 853.0,
            change: 3.0,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2330").join("history.csv");

        let history = PriceHistory::with_bars("2330", vec![bar("2024-05-02"), bar("2024-05-03")]);
        HistoryStore::save(&history, &path).unwrap();

        let loaded = HistoryStore::load("2330", &path).unwrap().unwrap();
        assert_eq!(loaded, history);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(HistoryStore::load("2330", &path).unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_extra_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(
            &path,
            "date,volume,open,high,low,close,change,extra\n2024-05-02,100,1,2,0.5,1.5,0.1,9\n",
        )
        .unwrap();

        assert!(HistoryStore::load("2330", &path).unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "date,volume,open,high,low,close\n2024-05-02,100,1,2,0.5,1.5\n").unwrap();

        assert!(HistoryStore::load("2330", &path).unwrap().is_none());
    }

    #[test]
    fn test_load_accepts_reordered_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(
            &path,
            "volume,date,open,high,low,close,change\n12345678,2024-05-02,850.0,857.0,847.0,853.0,3.0\n",
        )
        .unwrap();

        let loaded = HistoryStore::load("2330", &path).unwrap().unwrap();
        assert_eq!(loaded.bars, vec![bar("2024-05-02")]);
    }

    #[test]
    fn test_save_writes_canonical_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let history = PriceHistory::with_bars("2330", vec![bar("2024-05-02")]);
        HistoryStore::save(&history, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, "date,volume,open,high,low,close,change");
    }
}
