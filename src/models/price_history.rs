use chrono::NaiveDate;

use super::PriceBar;

/// Ordered daily price series for one symbol.
///
/// After reconciliation the dates are strictly increasing with no
/// duplicates; duplicates may appear transiently inside a merge and are
/// removed before the history is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn with_bars(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// Latest known trading date, if any bars exist.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// True when dates are strictly increasing with no duplicates.
    pub fn is_strictly_increasing(&self) -> bool {
        self.bars.windows(2).all(|pair| pair[0].date < pair[1].date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str) -> PriceBar {
        PriceBar {
            date: date.parse().unwrap(),
            volume: 1000,
            open: 10.0,
            high: 11.0,
            low: 9.5,
            close: 10.5,
            change: 0.5,
        }
    }

    #[test]
    fn test_last_date() {
        let mut history = PriceHistory::new("2330");
        assert_eq!(history.last_date(), None);

        history.bars.push(bar("2024-05-02"));
        history.bars.push(bar("2024-05-03"));
        assert_eq!(history.last_date(), Some("2024-05-03".parse().unwrap()));
    }

    #[test]
    fn test_strictly_increasing() {
        let history = PriceHistory::with_bars(
            "2330",
            vec![bar("2024-05-02"), bar("2024-05-03"), bar("2024-05-06")],
        );
        assert!(history.is_strictly_increasing());

        let duplicated = PriceHistory::with_bars("2330", vec![bar("2024-05-02"), bar("2024-05-02")]);
        assert!(!duplicated.is_strictly_increasing());

        let reversed = PriceHistory::with_bars("2330", vec![bar("2024-05-03"), bar("2024-05-02")]);
        assert!(!reversed.is_strictly_increasing());
    }
}
