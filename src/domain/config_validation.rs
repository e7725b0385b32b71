//! Configuration validation.
//!
//! Runs on the merged configuration (INI values with command-line overrides
//! applied), before any data is fetched.

use crate::domain::backtest::BacktestConfig;
use crate::domain::chart::ChartConfig;
use crate::domain::error::MacrossError;
use crate::domain::period::{Interval, Lookback};
use crate::domain::prediction::PredictConfig;

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), MacrossError> {
    const SECTION: &str = "backtest";
    validate_source(SECTION, &config.symbol, &config.period, &config.interval)?;
    validate_window(SECTION, "fast", config.fast)?;
    validate_window(SECTION, "slow", config.slow)?;
    validate_fee(config.fee_bps)?;
    validate_risk_free_rate(config.risk_free_rate)?;
    validate_periods_per_year(config.periods_per_year)?;
    Ok(())
}

pub fn validate_predict_config(config: &PredictConfig) -> Result<(), MacrossError> {
    const SECTION: &str = "predict";
    validate_source(SECTION, &config.symbol, &config.period, &config.interval)?;
    validate_window(SECTION, "fast", config.fast)?;
    validate_window(SECTION, "slow", config.slow)?;
    validate_window(SECTION, "rsi_window", config.rsi_window)?;
    validate_train_fraction(config.train_fraction)?;
    validate_threshold(config.signal_threshold)?;
    Ok(())
}

pub fn validate_chart_config(config: &ChartConfig) -> Result<(), MacrossError> {
    const SECTION: &str = "chart";
    validate_source(SECTION, &config.symbol, &config.period, &config.interval)?;
    validate_window(SECTION, "sma_window", config.sma_window)
}

/// Symbol, period and interval shared by every command.
pub fn validate_source(
    section: &str,
    symbol: &str,
    period: &str,
    interval: &str,
) -> Result<(), MacrossError> {
    if symbol.trim().is_empty() {
        return Err(MacrossError::ConfigMissing {
            section: section.to_string(),
            key: "symbol".to_string(),
        });
    }
    period.parse::<Lookback>().map_err(|reason| MacrossError::ConfigInvalid {
        section: section.to_string(),
        key: "period".to_string(),
        reason,
    })?;
    interval
        .parse::<Interval>()
        .map_err(|reason| MacrossError::ConfigInvalid {
            section: section.to_string(),
            key: "interval".to_string(),
            reason,
        })?;
    Ok(())
}

pub fn validate_window(section: &str, key: &str, value: usize) -> Result<(), MacrossError> {
    if value == 0 {
        return Err(MacrossError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be at least 1", key),
        });
    }
    Ok(())
}

fn validate_fee(value: f64) -> Result<(), MacrossError> {
    if !value.is_finite() || value < 0.0 {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "fee_bps".to_string(),
            reason: "fee_bps must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(value: f64) -> Result<(), MacrossError> {
    if !(0.0..1.0).contains(&value) {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_periods_per_year(value: f64) -> Result<(), MacrossError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "periods_per_year".to_string(),
            reason: "periods_per_year must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_train_fraction(value: f64) -> Result<(), MacrossError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(MacrossError::ConfigInvalid {
            section: "predict".to_string(),
            key: "train_fraction".to_string(),
            reason: "train_fraction must be between 0 and 1 (exclusive)".to_string(),
        });
    }
    Ok(())
}

fn validate_threshold(value: f64) -> Result<(), MacrossError> {
    if !value.is_finite() || value < 0.0 {
        return Err(MacrossError::ConfigInvalid {
            section: "predict".to_string(),
            key: "signal_threshold".to_string(),
            reason: "signal_threshold must be non-negative".to_string(),
        });
    }
    Ok(())
}
