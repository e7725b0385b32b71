//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// True when every price field is a finite number.
    pub fn is_complete(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Closing prices in bar order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Drops incomplete bars, sorts by date and keeps the first bar for each date.
pub fn normalize(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    bars.retain(OhlcvBar::is_complete);
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 50_000,
        }
    }

    #[test]
    fn complete_bar() {
        assert!(bar(15, 105.0).is_complete());
    }

    #[test]
    fn nan_close_is_incomplete() {
        let b = OhlcvBar {
            close: f64::NAN,
            ..bar(15, 105.0)
        };
        assert!(!b.is_complete());
    }

    #[test]
    fn closes_in_order() {
        let bars = vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.5)];
        assert_eq!(closes(&bars), vec![10.0, 11.0, 12.5]);
    }

    #[test]
    fn normalize_sorts_dedups_and_drops() {
        let broken = OhlcvBar {
            high: f64::INFINITY,
            ..bar(4, 13.0)
        };
        let bars = vec![bar(3, 12.0), bar(1, 10.0), broken, bar(1, 99.0), bar(2, 11.0)];
        let out = normalize(bars);
        let days: Vec<_> = out.iter().map(|b| b.date.format("%d").to_string()).collect();
        assert_eq!(days, vec!["01", "02", "03"]);
        assert_eq!(out[0].close, 10.0);
    }
}
