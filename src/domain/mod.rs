//! Core domain types and logic.

pub mod ohlcv;
pub mod period;
pub mod indicator;
pub mod indicator_helpers;
pub mod position;
pub mod returns;
pub mod metrics;
pub mod backtest;
pub mod features;
pub mod prediction;
pub mod chart;
pub mod outcome;
pub mod config_validation;
pub mod error;
