//! Chart-ready records: candles, line points and the SMA overlay.
//!
//! Times are `YYYY-MM-DD` strings, which charting front ends accept directly
//! for daily bars.

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use serde::Serialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decimal places kept on SMA overlay values.
const OVERLAY_DECIMALS: i32 = 4;

/// Parameters for the `ohlc` and `sma` commands.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub sma_window: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            symbol: "8058.T".into(),
            period: "2y".into(),
            interval: "1d".into(),
            sma_window: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub time: String,
    pub value: f64,
}

impl LinePoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            time: date.format(DATE_FORMAT).to_string(),
            value,
        }
    }
}

impl From<&OhlcvBar> for Candle {
    fn from(bar: &OhlcvBar) -> Self {
        Candle {
            time: bar.date.format(DATE_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

pub fn candles(bars: &[OhlcvBar]) -> Vec<Candle> {
    bars.iter().map(Candle::from).collect()
}

/// SMA line with points only where the window is full.
pub fn sma_overlay(bars: &[OhlcvBar], window: usize) -> Vec<LinePoint> {
    calculate_sma(bars, window)
        .values
        .iter()
        .filter(|p| p.valid)
        .map(|p| LinePoint::new(p.date, round_to(p.value, OVERLAY_DECIMALS)))
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
