//! RSI (Relative Strength Index) over simple rolling means.
//!
//! - delta[i] = C[i] - C[i-1], delta[0] counts as 0
//! - avg_gain / avg_loss: rolling mean of max(delta, 0) / max(-delta, 0) over n bars
//! - RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! Zero average loss leaves the ratio undefined, and undefined points (warmup
//! included) are filled with the neutral 50.0. An unbroken uptrend therefore
//! reads 50, not 100. Every point of the returned series is valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_mean;
use crate::domain::ohlcv::OhlcvBar;

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let change = if i == 0 { 0.0 } else { bar.close - bars[i - 1].close };
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    let values = bars
        .iter()
        .zip(avg_gains.into_iter().zip(avg_losses))
        .map(|(bar, averages)| {
            let rsi = match averages {
                (Some(gain), Some(loss)) if loss != 0.0 => 100.0 - (100.0 / (1.0 + gain / loss)),
                _ => NEUTRAL_RSI,
            };
            IndicatorPoint {
                date: bar.date,
                valid: true,
                value: if rsi.is_finite() { rsi } else { NEUTRAL_RSI },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
