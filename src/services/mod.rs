pub mod history;
pub mod listing;
pub mod store;
pub mod twse;

pub use history::HistoryReconciler;
pub use store::HistoryStore;
pub use twse::{RawDailyRow, TwseClient};
