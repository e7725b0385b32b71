//! Regression model port.

use crate::domain::error::MacrossError;

/// A model trained on numeric feature rows to predict a scalar target.
pub trait Regressor {
    /// `rows[i]` is paired with `targets[i]`; every row has the same width.
    fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<(), MacrossError>;

    fn predict(&self, row: &[f64]) -> Result<f64, MacrossError>;
}
