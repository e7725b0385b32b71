//! Moving-average crossover backtest.
//!
//! BacktestConfig carries every parameter of a run; nothing is read from
//! module-level defaults. The pipeline is linear: indicators -> positions ->
//! returns -> equity -> metrics.

use crate::domain::chart::LinePoint;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::metrics::{Metrics, TRADING_DAYS_PER_YEAR};
use crate::domain::ohlcv::{OhlcvBar, closes};
use crate::domain::outcome::Failure;
use crate::domain::period::Interval;
use crate::domain::position::{Position, generate_positions, trade_flags};
use crate::domain::returns::{EquityPoint, bar_returns, equity_curve, strategy_returns};
use chrono::NaiveDate;
use serde::Serialize;

/// Bars needed before a single close-to-close return exists.
pub const MIN_BARS_FOR_RETURNS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub fast: usize,
    pub slow: usize,
    pub fee_bps: f64,
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: "8058.T".into(),
            period: "2y".into(),
            interval: "1d".into(),
            fast: 5,
            slow: 20,
            fee_bps: 5.0,
            risk_free_rate: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub positions: Vec<Position>,
    pub trades: Vec<bool>,
    pub bar_returns: Vec<f64>,
    pub strategy_returns: Vec<f64>,
    pub equity: Vec<EquityPoint>,
    pub metrics: Metrics,
}

/// Runs the crossover rule over `bars`, which must be sorted by date.
pub fn run_backtest(bars: &[OhlcvBar], config: &BacktestConfig) -> Result<BacktestResult, Failure> {
    if bars.is_empty() {
        return Err(Failure::NoData);
    }
    if bars.len() < MIN_BARS_FOR_RETURNS {
        return Err(Failure::NoReturns);
    }

    if let Ok(interval) = config.interval.parse::<Interval>() {
        if !interval.is_daily() {
            tracing::warn!(
                interval = %interval,
                "CAGR assumes {} daily bars per year; interval is not daily",
                TRADING_DAYS_PER_YEAR
            );
        }
    }

    let fast_ma = calculate_sma(bars, config.fast);
    let slow_ma = calculate_sma(bars, config.slow);

    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let positions = generate_positions(&fast_ma, &slow_ma, bars.len());
    let trades = trade_flags(&positions);
    let bar_returns = bar_returns(&closes(bars));
    let strategy_returns = strategy_returns(&positions, &bar_returns, &trades, config.fee_bps);
    let equity = equity_curve(&dates, &strategy_returns);

    let metrics = Metrics::compute(
        &equity,
        &strategy_returns,
        &trades,
        config.risk_free_rate,
        config.periods_per_year,
    );

    tracing::debug!(
        bars = bars.len(),
        trades = metrics.trade_count,
        last_equity = metrics.last_equity,
        "backtest complete"
    );

    Ok(BacktestResult {
        positions,
        trades,
        bar_returns,
        strategy_returns,
        equity,
        metrics,
    })
}

/// JSON record for a completed backtest.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub fast: usize,
    pub slow: usize,
    pub fee_bps: f64,
    pub metrics: Metrics,
    pub equity: Vec<LinePoint>,
}

impl BacktestReport {
    /// The equity line starts at bar `max(fast, slow)`, after both averages
    /// have produced a value that a position could act on.
    pub fn new(config: &BacktestConfig, result: &BacktestResult) -> Self {
        let start = config.fast.max(config.slow);
        let equity = result
            .equity
            .iter()
            .skip(start)
            .map(|p| LinePoint::new(p.date, p.equity))
            .collect();

        Self {
            symbol: config.symbol.clone(),
            period: config.period.clone(),
            interval: config.interval.clone(),
            fast: config.fast,
            slow: config.slow,
            fee_bps: config.fee_bps,
            metrics: result.metrics.clone(),
            equity,
        }
    }
}
