//! Sentinel outcomes reported in place of a result.
//!
//! These are expected results of a run, not faults: the CLI prints them as a
//! JSON record and exits successfully.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    /// The data source returned no bars.
    NoData,
    /// Bars were returned but none yields a usable observation.
    NoReturns,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::NoData => write!(f, "no_data"),
            Failure::NoReturns => write!(f, "no_returns"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub error: Failure,
}

impl FailureRecord {
    pub fn new(symbol: &str, period: &str, interval: &str, error: Failure) -> Self {
        Self {
            symbol: symbol.to_string(),
            period: period.to_string(),
            interval: interval.to_string(),
            error,
        }
    }
}

/// What a command prints: its result, or the sentinel record.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Completed(T),
    Failed(FailureRecord),
}

impl<T> Outcome<T> {
    pub fn failure(&self) -> Option<Failure> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Failed(record) => Some(record.error),
        }
    }
}
