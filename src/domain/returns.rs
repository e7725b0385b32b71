//! Bar returns, fee attribution and equity compounding.

use crate::domain::position::Position;
use chrono::NaiveDate;

const BPS_PER_UNIT: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Close-to-close fractional change; 0 on the first bar or after a zero close.
pub fn bar_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    for (i, &close) in closes.iter().enumerate() {
        let r = if i == 0 { 0.0 } else { close / closes[i - 1] - 1.0 };
        out.push(if r.is_finite() { r } else { 0.0 });
    }
    out
}

pub fn fee_rate(fee_bps: f64) -> f64 {
    fee_bps / BPS_PER_UNIT
}

/// position x return, less the one-way fee on every bar that trades.
pub fn strategy_returns(
    positions: &[Position],
    returns: &[f64],
    trades: &[bool],
    fee_bps: f64,
) -> Vec<f64> {
    let fee = fee_rate(fee_bps);
    positions
        .iter()
        .zip(returns)
        .zip(trades)
        .map(|((pos, r), &traded)| {
            let cost = if traded { fee } else { 0.0 };
            pos.exposure() * r - cost
        })
        .collect()
}

/// Compounds strategy returns from a starting equity of 1.0.
pub fn equity_curve(dates: &[NaiveDate], strategy_returns: &[f64]) -> Vec<EquityPoint> {
    let mut equity = 1.0;
    dates
        .iter()
        .zip(strategy_returns)
        .map(|(&date, r)| {
            equity *= 1.0 + r;
            EquityPoint { date, equity }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Position::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
    }

    #[test]
    fn bar_returns_basic() {
        let r = bar_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 3);
        assert_eq!(r[0], 0.0);
        assert!((r[1] - 0.10).abs() < 1e-12);
        assert!((r[2] - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn bar_returns_zero_previous_close() {
        let r = bar_returns(&[0.0, 10.0]);
        assert_eq!(r, vec![0.0, 0.0]);
    }

    #[test]
    fn bar_returns_empty() {
        assert!(bar_returns(&[]).is_empty());
    }

    #[test]
    fn fee_rate_from_bps() {
        assert!((fee_rate(5.0) - 0.0005).abs() < 1e-15);
        assert_eq!(fee_rate(0.0), 0.0);
    }

    #[test]
    fn strategy_returns_charge_fee_on_changes() {
        let positions = [Flat, Long, Long, Flat];
        let returns = [0.0, 0.02, -0.01, 0.05];
        let trades = [false, true, false, true];
        let out = strategy_returns(&positions, &returns, &trades, 10.0);

        assert_eq!(out[0], 0.0);
        assert!((out[1] - (0.02 - 0.001)).abs() < 1e-12);
        assert!((out[2] - (-0.01)).abs() < 1e-12);
        assert!((out[3] - (-0.001)).abs() < 1e-12);
    }

    #[test]
    fn equity_compounds() {
        let curve = equity_curve(&dates(3), &[0.10, -0.10, 0.0]);
        assert_eq!(curve.len(), 3);
        assert!((curve[0].equity - 1.10).abs() < 1e-12);
        assert!((curve[1].equity - 0.99).abs() < 1e-12);
        assert!((curve[2].equity - 0.99).abs() < 1e-12);
        assert_eq!(curve[2].date, dates(3)[2]);
    }
}
