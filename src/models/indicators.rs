//! Technical indicator derivations over a daily price series.
//!
//! Every derivation appends named `f64` columns the length of the source
//! series; cells inside an indicator's warm-up period are NaN. Frames are
//! built on demand from a finished history and never persisted.

use std::collections::BTreeMap;

use crate::constants::{DEFAULT_BBAND_WINDOW, DEFAULT_SMA_WINDOWS, KD_RSV_WINDOW};

use super::PriceBar;

/// Derived indicator columns for one price series, keyed by name
/// (`5ma`, `22std`, `bband_up`, `k`, ...).
#[derive(Debug, Default)]
pub struct IndicatorFrame {
    columns: BTreeMap<String, Vec<f64>>,
}

impl IndicatorFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame with the standard derivations: the default SMA windows,
    /// 22-bar Bollinger bands and the stochastic K/D oscillator.
    pub fn standard(bars: &[PriceBar]) -> Self {
        let mut frame = Self::new();
        frame.add_sma(bars, DEFAULT_SMA_WINDOWS);
        frame.add_bband(bars, DEFAULT_BBAND_WINDOW);
        frame.add_kd(bars);
        frame
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|values| values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|name| name.as_str())
    }

    /// Trailing simple moving averages of close, one `{n}ma` column per
    /// window. The first `n-1` cells of each column are NaN.
    pub fn add_sma(&mut self, bars: &[PriceBar], windows: &[usize]) {
        let closes = closes(bars);
        for &window in windows {
            self.columns
                .insert(format!("{}ma", window), rolling_mean(&closes, window));
        }
    }

    /// Bollinger-style bands over `window` bars: `{w}ma`, `{w}std` (sample
    /// standard deviation) and `bband_up`/`bband_low` at two deviations.
    pub fn add_bband(&mut self, bars: &[PriceBar], window: usize) {
        let closes = closes(bars);
        let ma = rolling_mean(&closes, window);
        let std = rolling_std(&closes, window);
        let up: Vec<f64> = ma.iter().zip(&std).map(|(m, s)| m + 2.0 * s).collect();
        let low: Vec<f64> = ma.iter().zip(&std).map(|(m, s)| m - 2.0 * s).collect();
        self.columns.insert(format!("{}ma", window), ma);
        self.columns.insert(format!("{}std", window), std);
        self.columns.insert("bband_up".to_string(), up);
        self.columns.insert("bband_low".to_string(), low);
    }

    /// Stochastic oscillator K/D with a 9-bar RSV and 1/3 recursive
    /// smoothing.
    ///
    /// `k` and `d` are seeded at 50 on the first row; every later row
    /// depends on the previous one, so unlike the windowed indicators the
    /// fill is strictly sequential over pre-allocated vectors.
    pub fn add_kd(&mut self, bars: &[PriceBar]) {
        let rsv = raw_stochastic(bars, KD_RSV_WINDOW);
        let len = bars.len();
        let mut k = vec![f64::NAN; len];
        let mut d = vec![f64::NAN; len];
        if len > 0 {
            k[0] = 50.0;
            d[0] = 50.0;
            for i in 1..len {
                k[i] = (2.0 * k[i - 1] + rsv[i]) / 3.0;
                d[i] = (2.0 * d[i - 1] + k[i]) / 3.0;
            }
        }
        self.columns.insert("k".to_string(), k);
        self.columns.insert("d".to_string(), d);
    }
}

fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}

/// Trailing mean over `window` values; NaN while fewer than `window` exist.
fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window.saturating_sub(1))..values.len() {
        let start = i + 1 - window;
        let sum: f64 = values[start..=i].iter().sum();
        out[i] = sum / window as f64;
    }
    out
}

/// Trailing sample standard deviation (n-1 denominator) over `window`
/// values; NaN while fewer than `window` exist.
fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window < 2 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let start = i + 1 - window;
        let slice = &values[start..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        out[i] = variance.sqrt();
    }
    out
}

/// Raw stochastic value over a trailing window:
/// `100 * (close - lowest low) / (highest high - lowest low)`.
///
/// The leading undefined cells are back-filled with the first defined
/// value so the K/D recursion has a usable input from row one.
fn raw_stochastic(bars: &[PriceBar], window: usize) -> Vec<f64> {
    let mut rsv = vec![f64::NAN; bars.len()];
    if window == 0 {
        return rsv;
    }
    for i in (window - 1)..bars.len() {
        let start = i + 1 - window;
        let lowest = bars[start..=i]
            .iter()
            .map(|bar| bar.low)
            .fold(f64::INFINITY, f64::min);
        let highest = bars[start..=i]
            .iter()
            .map(|bar| bar.high)
            .fold(f64::NEG_INFINITY, f64::max);
        rsv[i] = 100.0 * (bars[i].close - lowest) / (highest - lowest);
    }
    if let Some(first_defined) = rsv.iter().position(|value| !value.is_nan()) {
        let fill = rsv[first_defined];
        for value in &mut rsv[..first_defined] {
            *value = fill;
        }
    }
    rsv
}
