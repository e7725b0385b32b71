//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod random_forest;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
