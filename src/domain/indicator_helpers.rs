//! Shared helper functions for indicator calculations.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use std::collections::HashMap;

/// Trailing arithmetic mean over `window` values.
///
/// Element i is `Some(mean(values[i+1-window..=i]))` once `i >= window - 1`,
/// `None` before that. A zero window yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                // Averaging offsets from the first value keeps a constant
                // window exactly equal to that constant.
                let slice = &values[i + 1 - window..=i];
                let anchor = slice[0];
                let offset = slice.iter().map(|v| v - anchor).sum::<f64>() / window as f64;
                Some(anchor + offset)
            }
        })
        .collect()
}

/// Computes each distinct indicator once, keyed by type.
pub fn compute_indicators(
    bars: &[OhlcvBar],
    types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let mut out = HashMap::new();
    for &indicator_type in types {
        out.entry(indicator_type).or_insert_with(|| match indicator_type {
            IndicatorType::Sma(period) => calculate_sma(bars, period),
            IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rolling_mean_basic() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn rolling_mean_window_equals_len() {
        let out = rolling_mean(&[2.0, 4.0, 6.0], 3);
        assert_eq!(out, vec![None, None, Some(4.0)]);
    }

    #[test]
    fn rolling_mean_constant_is_exact() {
        let out = rolling_mean(&[0.1; 7], 3);
        assert!(out[2..].iter().all(|v| *v == Some(0.1)));
    }

    #[test]
    fn rolling_mean_window_too_long() {
        let out = rolling_mean(&[2.0, 4.0], 3);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn rolling_mean_zero_window() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn rolling_mean_empty() {
        assert!(rolling_mean(&[], 5).is_empty());
    }

    #[test]
    fn compute_indicators_dedups() {
        let bars: Vec<OhlcvBar> = (0..30)
            .map(|i| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64,
                volume: 1000,
            })
            .collect();

        let types = [
            IndicatorType::Sma(5),
            IndicatorType::Sma(20),
            IndicatorType::Sma(5),
            IndicatorType::Rsi(14),
        ];
        let map = compute_indicators(&bars, &types);

        assert_eq!(map.len(), 3);
        assert_eq!(map[&IndicatorType::Sma(5)].len(), 30);
        assert_eq!(map[&IndicatorType::Sma(20)].get(18), None);
        assert!(map[&IndicatorType::Sma(20)].get(19).is_some());
        assert_eq!(map[&IndicatorType::Rsi(14)].indicator_type, IndicatorType::Rsi(14));
    }
}
