//! Performance metrics over an equity curve and its strategy returns.

use super::returns::EquityPoint;
use serde::Serialize;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub trade_count: usize,
    pub last_equity: f64,
}

impl Metrics {
    /// `equity`, `strategy_returns` and `trades` are aligned bar for bar.
    pub fn compute(
        equity: &[EquityPoint],
        strategy_returns: &[f64],
        trades: &[bool],
        risk_free_rate: f64,
        periods_per_year: f64,
    ) -> Self {
        let last_equity = equity.last().map(|p| p.equity).unwrap_or(1.0);

        Metrics {
            cagr: compute_cagr(last_equity, strategy_returns.len()),
            max_drawdown: compute_max_drawdown(equity),
            sharpe: compute_sharpe(strategy_returns, risk_free_rate, periods_per_year),
            trade_count: trades.iter().filter(|&&t| t).count(),
            last_equity,
        }
    }
}

/// Worst `equity / running_max - 1`; 0 when the curve never falls below a peak.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        let dd = point.equity / peak - 1.0;
        if dd.is_finite() && dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Annualized Sharpe over population standard deviation of excess returns.
pub fn compute_sharpe(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() || periods_per_year <= 0.0 {
        return 0.0;
    }

    let per_period_rf = risk_free_rate / periods_per_year;
    let n = returns.len() as f64;

    let mean: f64 = returns.iter().map(|r| r - per_period_rf).sum::<f64>() / n;
    let variance: f64 = returns
        .iter()
        .map(|r| (r - per_period_rf - mean).powi(2))
        .sum::<f64>()
        / n;
    let stddev = variance.max(0.0).sqrt();

    if !stddev.is_finite() || stddev == 0.0 {
        return 0.0;
    }

    let sharpe = (mean / stddev) * periods_per_year.sqrt();
    if sharpe.is_finite() { sharpe } else { 0.0 }
}

/// `last_equity^(252 / observations) - 1`, assuming daily bars.
pub fn compute_cagr(last_equity: f64, observations: usize) -> f64 {
    if observations == 0 || last_equity <= 0.0 || !last_equity.is_finite() {
        return 0.0;
    }
    let cagr = last_equity.powf(TRADING_DAYS_PER_YEAR / observations as f64) - 1.0;
    if cagr.is_finite() { cagr } else { 0.0 }
}
