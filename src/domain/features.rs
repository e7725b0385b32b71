//! Feature and label construction for next-bar return prediction.
//!
//! Per bar: previous-bar return, fast and slow SMA, RSI. The label on bar t is
//! the return from close[t] to close[t+1], so the newest bar never has one.

use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use serde::Serialize;

pub const FEATURE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRow {
    pub ret: f64,
    pub ma_fast: f64,
    pub ma_slow: f64,
    pub rsi: f64,
}

impl FeatureRow {
    /// Column order fed to the regressor.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.ret, self.ma_fast, self.ma_slow, self.rsi]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub features: FeatureRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelledPoint {
    pub point: FeaturePoint,
    pub target: f64,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    /// Bars with every feature and the next-bar target defined, oldest first.
    pub labelled: Vec<LabelledPoint>,
    /// Newest bar, when all of its features are defined.
    pub latest: Option<FeaturePoint>,
}

pub fn build_features(bars: &[OhlcvBar], fast: usize, slow: usize, rsi_window: usize) -> FeatureSet {
    let fast_type = IndicatorType::Sma(fast);
    let slow_type = IndicatorType::Sma(slow);
    let rsi_type = IndicatorType::Rsi(rsi_window);
    let indicators = compute_indicators(bars, &[fast_type, slow_type, rsi_type]);

    let point_at = |t: usize| -> Option<FeaturePoint> {
        let ret = pct_change(bars, t)?;
        let features = FeatureRow {
            ret,
            ma_fast: indicators.get(&fast_type)?.get(t)?,
            ma_slow: indicators.get(&slow_type)?.get(t)?,
            rsi: indicators.get(&rsi_type)?.get(t)?,
        };
        Some(FeaturePoint {
            date: bars[t].date,
            close: bars[t].close,
            features,
        })
    };

    let mut set = FeatureSet::default();
    for t in 0..bars.len() {
        let Some(point) = point_at(t) else { continue };
        match pct_change(bars, t + 1) {
            Some(target) => set.labelled.push(LabelledPoint { point, target }),
            None if t + 1 == bars.len() => set.latest = Some(point),
            None => {}
        }
    }
    set
}

/// close[t] / close[t-1] - 1, undefined at t = 0, past the end, or when non-finite.
fn pct_change(bars: &[OhlcvBar], t: usize) -> Option<f64> {
    if t == 0 || t >= bars.len() {
        return None;
    }
    let r = bars[t].close / bars[t - 1].close - 1.0;
    r.is_finite().then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn labelled_rows_need_slow_window_and_next_bar() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let set = build_features(&make_bars(&closes), 2, 4, 3);

        // slow SMA defined from bar 3; bar 9 has no next bar
        assert_eq!(set.labelled.len(), 6);
        assert_eq!(set.labelled[0].point.date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert!(set.latest.is_some());
        assert_eq!(set.latest.as_ref().unwrap().close, 109.0);
    }

    #[test]
    fn feature_values() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        let set = build_features(&make_bars(&closes), 2, 3, 2);
        let first = &set.labelled[0];

        // bar 2
        assert!((first.point.features.ret - (12.0 / 11.0 - 1.0)).abs() < 1e-12);
        assert!((first.point.features.ma_fast - 11.5).abs() < 1e-12);
        assert!((first.point.features.ma_slow - 11.0).abs() < 1e-12);
        assert_eq!(first.point.features.rsi, 50.0);
        assert!((first.target - (13.0 / 12.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn to_vec_column_order() {
        let row = FeatureRow {
            ret: 0.01,
            ma_fast: 10.0,
            ma_slow: 9.0,
            rsi: 55.0,
        };
        assert_eq!(row.to_vec(), vec![0.01, 10.0, 9.0, 55.0]);
        assert_eq!(row.to_vec().len(), FEATURE_COUNT);
    }

    #[test]
    fn too_short_has_no_rows() {
        let set = build_features(&make_bars(&[1.0, 2.0, 3.0]), 5, 20, 14);
        assert!(set.labelled.is_empty());
        assert!(set.latest.is_none());
    }

    #[test]
    fn empty_bars() {
        let set = build_features(&[], 5, 20, 14);
        assert!(set.labelled.is_empty());
        assert!(set.latest.is_none());
    }
}
