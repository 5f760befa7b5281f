mod listing;
mod price_bar;
mod price_history;
pub mod indicators;

pub use indicators::IndicatorFrame;
pub use listing::ListedSecurity;
pub use price_bar::PriceBar;
pub use price_history::PriceHistory;
