use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::PriceHistory;
use crate::services::{HistoryReconciler, HistoryStore, TwseClient};

pub fn run(stock: Option<String>, path: Option<PathBuf>) {
    let Some(stock) = stock else {
        println!("You did not specify a stock id");
        return;
    };
    let path = path.unwrap_or_else(|| HistoryStore::default_path(&stock));

    match update_history(&stock, &path) {
        Ok(history) => {
            println!("{}: {} bars saved to {}", stock, history.len(), path.display());
        }
        Err(e) => {
            eprintln!("❌ History update failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load-or-bootstrap, fetch the gap since the last persisted date, save.
fn update_history(stock: &str, path: &Path) -> Result<PriceHistory> {
    let reconciler = HistoryReconciler::new(TwseClient::new());

    let mut history = match HistoryStore::load(stock, path)? {
        Some(history) => history,
        None => reconciler.build_initial(stock)?,
    };

    let appended = reconciler.update(&mut history)?;
    info!("{} new bars for {}", appended, stock);

    HistoryStore::save(&history, path)?;
    Ok(history)
}
