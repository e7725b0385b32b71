//! Next-bar return prediction and the BUY / SELL / HOLD signal.
//!
//! Training uses the oldest `train_fraction` of the labelled rows; the
//! prediction is made from the newest bar's features.

use crate::domain::error::MacrossError;
use crate::domain::features::{FeaturePoint, FeatureRow, LabelledPoint, build_features};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::outcome::Failure;
use crate::ports::regressor_port::Regressor;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictConfig {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub fast: usize,
    pub slow: usize,
    pub rsi_window: usize,
    pub train_fraction: f64,
    pub signal_threshold: f64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            symbol: "8058.T".into(),
            period: "2y".into(),
            interval: "1d".into(),
            fast: 5,
            slow: 20,
            rsi_window: 14,
            train_fraction: 0.8,
            signal_threshold: 0.005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// BUY needs a predicted gain above the threshold in an uptrend (fast MA
    /// above slow), SELL the mirror image; anything else holds.
    pub fn decide(predicted_return: f64, features: &FeatureRow, threshold: f64) -> Self {
        if predicted_return > threshold && features.ma_fast > features.ma_slow {
            Signal::Buy
        } else if predicted_return < -threshold && features.ma_fast < features.ma_slow {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub train: Vec<LabelledPoint>,
    pub latest: FeaturePoint,
}

/// Builds features and splits off the training rows.
pub fn prepare_training(bars: &[OhlcvBar], config: &PredictConfig) -> Result<TrainingSet, Failure> {
    if bars.is_empty() {
        return Err(Failure::NoData);
    }

    let set = build_features(bars, config.fast, config.slow, config.rsi_window);
    let split = (set.labelled.len() as f64 * config.train_fraction).floor() as usize;
    let latest = set.latest.ok_or(Failure::NoReturns)?;
    if split == 0 {
        return Err(Failure::NoReturns);
    }

    let mut train = set.labelled;
    train.truncate(split);

    tracing::debug!(train_rows = train.len(), latest = %latest.date, "training set ready");
    Ok(TrainingSet { train, latest })
}

/// JSON record for a prediction run.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub symbol: String,
    pub predicted_return: f64,
    pub signal: Signal,
    pub last_close: f64,
    pub features: FeatureRow,
}

/// Fits `model` on the training rows and predicts from the latest bar.
pub fn predict_signal(
    training: &TrainingSet,
    config: &PredictConfig,
    model: &mut dyn Regressor,
) -> Result<PredictionReport, MacrossError> {
    let rows: Vec<Vec<f64>> = training.train.iter().map(|p| p.point.features.to_vec()).collect();
    let targets: Vec<f64> = training.train.iter().map(|p| p.target).collect();

    model.fit(&rows, &targets)?;

    let features = training.latest.features;
    let predicted_return = model.predict(&features.to_vec())?;
    if !predicted_return.is_finite() {
        return Err(MacrossError::Model {
            reason: format!("non-finite prediction {}", predicted_return),
        });
    }

    Ok(PredictionReport {
        symbol: config.symbol.clone(),
        predicted_return,
        signal: Signal::decide(predicted_return, &features, config.signal_threshold),
        last_close: training.latest.close,
        features,
    })
}
