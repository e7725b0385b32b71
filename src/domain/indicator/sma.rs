//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n
//! Warmup: first (n-1) bars are invalid. A zero period yields no valid points.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_mean;
use crate::domain::ohlcv::{OhlcvBar, closes};

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let means = rolling_mean(&closes(bars), period);

    let values = bars
        .iter()
        .zip(means)
        .map(|(bar, mean)| IndicatorPoint {
            date: bar.date,
            valid: mean.is_some(),
            value: mean.unwrap_or(0.0),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
