//! CLI definition and dispatch.
//!
//! Every command resolves its parameters as command-line flag, then INI value
//! from `--config`, then built-in default; validates them; fetches bars through
//! a [`DataPort`]; and prints exactly one JSON document on stdout.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::random_forest::{ForestConfig, RandomForestRegressor};
use crate::domain::backtest::{BacktestConfig, BacktestReport, run_backtest};
use crate::domain::chart::{Candle, ChartConfig, LinePoint, candles, sma_overlay};
use crate::domain::config_validation::{
    validate_backtest_config, validate_chart_config, validate_predict_config, validate_window,
};
use crate::domain::error::MacrossError;
use crate::domain::outcome::{FailureRecord, Outcome};
use crate::domain::prediction::{PredictConfig, PredictionReport, predict_signal, prepare_training};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::regressor_port::Regressor;

pub const DEFAULT_CSV_DIR: &str = "data";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "macross",
    about = "Moving-average crossover backtests and next-day return signals"
)]
pub struct Cli {
    /// INI file with [data], [backtest], [predict] and [chart] sections
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print chart candles for every bar
    Ohlc {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Print a simple moving average line for charting
    Sma {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long)]
        window: Option<usize>,
    },
    /// Backtest the long-only moving-average crossover
    Backtest {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        params: BacktestArgs,
    },
    /// Predict the next-bar return and emit BUY / SELL / HOLD
    Predict {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        params: PredictArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Csv,
    Yahoo,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[arg(long)]
    pub symbol: Option<String>,
    /// Lookback such as 6mo, 2y, ytd, max
    #[arg(long)]
    pub period: Option<String>,
    /// Bar size such as 1d, 1wk, 1h
    #[arg(long)]
    pub interval: Option<String>,
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,
    /// Directory holding <SYMBOL>_<interval>.csv files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BacktestArgs {
    #[arg(long)]
    pub fast: Option<usize>,
    #[arg(long)]
    pub slow: Option<usize>,
    #[arg(long, allow_negative_numbers = true)]
    pub fee_bps: Option<f64>,
    /// Annual risk-free rate used for Sharpe
    #[arg(long, allow_negative_numbers = true)]
    pub risk_free: Option<f64>,
    #[arg(long)]
    pub periods_per_year: Option<f64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PredictArgs {
    #[arg(long)]
    pub trees: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub train_fraction: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,
}

/// Where bars come from, after flags and INI are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub csv_dir: PathBuf,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Installs the stderr log subscriber. `RUST_LOG` wins when set.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), MacrossError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ohlc { data } => {
            let chart = build_chart_config(&config, &data, None)?;
            let port = build_data_port(&build_source_settings(&config, &data)?)?;
            emit(&ohlc_pipeline(port.as_ref(), &chart)?)
        }
        Command::Sma { data, window } => {
            let chart = build_chart_config(&config, &data, window)?;
            let port = build_data_port(&build_source_settings(&config, &data)?)?;
            emit(&sma_pipeline(port.as_ref(), &chart)?)
        }
        Command::Backtest { data, params } => {
            let bt_config = build_backtest_config(&config, &data, &params)?;
            let port = build_data_port(&build_source_settings(&config, &data)?)?;
            emit(&backtest_pipeline(port.as_ref(), &bt_config)?)
        }
        Command::Predict { data, params } => {
            let predict_config = build_predict_config(&config, &data, &params)?;
            let forest_config = build_forest_config(&config, &params)?;
            let port = build_data_port(&build_source_settings(&config, &data)?)?;
            let mut model = RandomForestRegressor::new(forest_config);
            emit(&predict_pipeline(port.as_ref(), &predict_config, &mut model)?)
        }
    }
}

/// Reads the INI file, or an empty configuration when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, MacrossError> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    tracing::info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| MacrossError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn emit<T: Serialize>(value: &T) -> Result<(), MacrossError> {
    let json = serde_json::to_string(value)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}

fn get_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, MacrossError> {
    let value = config.get_int(section, key, default as i64)?;
    usize::try_from(value).map_err(|_| MacrossError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("expected a non-negative integer, got {}", value),
    })
}

fn flag_or_double(
    flag: Option<f64>,
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, MacrossError> {
    match flag {
        Some(v) => Ok(v),
        None => config.get_double(section, key, default),
    }
}

/// Symbol, period and interval from flags, then `[data]`, then defaults.
fn resolve_instrument(config: &dyn ConfigPort, data: &DataArgs) -> (String, String, String) {
    let pick = |flag: &Option<String>, key: &str, default: &str| {
        flag.clone()
            .or_else(|| config.get_string("data", key))
            .unwrap_or_else(|| default.to_string())
    };
    (
        pick(&data.symbol, "symbol", "8058.T"),
        pick(&data.period, "period", "2y"),
        pick(&data.interval, "interval", "1d"),
    )
}

pub fn build_source_settings(
    config: &dyn ConfigPort,
    data: &DataArgs,
) -> Result<SourceSettings, MacrossError> {
    let kind = match data.source {
        Some(kind) => kind,
        None => match config.get_string("data", "source") {
            Some(raw) => SourceKind::from_str(&raw, true).map_err(|_| {
                MacrossError::ConfigInvalid {
                    section: "data".into(),
                    key: "source".into(),
                    reason: format!("unknown source '{}' (expected csv or yahoo)", raw),
                }
            })?,
            None => default_source(),
        },
    };

    let csv_dir = data
        .data_dir
        .clone()
        .or_else(|| config.get_string("data", "csv_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR));

    let timeout = config.get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
    let timeout_secs = u64::try_from(timeout)
        .ok()
        .filter(|&t| t > 0)
        .ok_or_else(|| MacrossError::ConfigInvalid {
            section: "data".into(),
            key: "timeout_secs".into(),
            reason: "timeout_secs must be positive".into(),
        })?;

    Ok(SourceSettings {
        kind,
        csv_dir,
        base_url: config
            .get_string("data", "base_url")
            .unwrap_or_else(|| DEFAULT_YAHOO_URL.to_string()),
        timeout_secs,
    })
}

fn default_source() -> SourceKind {
    if cfg!(feature = "yahoo") {
        SourceKind::Yahoo
    } else {
        SourceKind::Csv
    }
}

pub fn build_data_port(settings: &SourceSettings) -> Result<Box<dyn DataPort>, MacrossError> {
    match settings.kind {
        SourceKind::Csv => {
            tracing::info!("Reading bars from {}", settings.csv_dir.display());
            Ok(Box::new(CsvAdapter::new(settings.csv_dir.clone())))
        }
        #[cfg(feature = "yahoo")]
        SourceKind::Yahoo => {
            use crate::adapters::yahoo_adapter::YahooAdapter;
            Ok(Box::new(YahooAdapter::new(
                &settings.base_url,
                settings.timeout_secs,
            )?))
        }
        #[cfg(not(feature = "yahoo"))]
        SourceKind::Yahoo => Err(MacrossError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "built without the yahoo feature".into(),
        }),
    }
}

pub fn build_chart_config(
    config: &dyn ConfigPort,
    data: &DataArgs,
    window: Option<usize>,
) -> Result<ChartConfig, MacrossError> {
    let (symbol, period, interval) = resolve_instrument(config, data);
    let defaults = ChartConfig::default();
    let sma_window = match window {
        Some(w) => w,
        None => get_usize(config, "chart", "sma_window", defaults.sma_window)?,
    };
    let chart = ChartConfig {
        symbol,
        period,
        interval,
        sma_window,
    };
    validate_chart_config(&chart)?;
    Ok(chart)
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    data: &DataArgs,
    params: &BacktestArgs,
) -> Result<BacktestConfig, MacrossError> {
    let (symbol, period, interval) = resolve_instrument(config, data);
    let defaults = BacktestConfig::default();

    let fast = match params.fast {
        Some(v) => v,
        None => get_usize(config, "backtest", "fast", defaults.fast)?,
    };
    let slow = match params.slow {
        Some(v) => v,
        None => get_usize(config, "backtest", "slow", defaults.slow)?,
    };

    let bt_config = BacktestConfig {
        symbol,
        period,
        interval,
        fast,
        slow,
        fee_bps: flag_or_double(
            params.fee_bps,
            config,
            "backtest",
            "fee_bps",
            defaults.fee_bps,
        )?,
        risk_free_rate: flag_or_double(
            params.risk_free,
            config,
            "backtest",
            "risk_free_rate",
            defaults.risk_free_rate,
        )?,
        periods_per_year: flag_or_double(
            params.periods_per_year,
            config,
            "backtest",
            "periods_per_year",
            defaults.periods_per_year,
        )?,
    };
    validate_backtest_config(&bt_config)?;
    Ok(bt_config)
}

pub fn build_predict_config(
    config: &dyn ConfigPort,
    data: &DataArgs,
    params: &PredictArgs,
) -> Result<PredictConfig, MacrossError> {
    let (symbol, period, interval) = resolve_instrument(config, data);
    let defaults = PredictConfig::default();

    let predict_config = PredictConfig {
        symbol,
        period,
        interval,
        fast: get_usize(config, "predict", "fast", defaults.fast)?,
        slow: get_usize(config, "predict", "slow", defaults.slow)?,
        rsi_window: get_usize(config, "predict", "rsi_window", defaults.rsi_window)?,
        train_fraction: flag_or_double(
            params.train_fraction,
            config,
            "predict",
            "train_fraction",
            defaults.train_fraction,
        )?,
        signal_threshold: flag_or_double(
            params.threshold,
            config,
            "predict",
            "signal_threshold",
            defaults.signal_threshold,
        )?,
    };
    validate_predict_config(&predict_config)?;
    Ok(predict_config)
}

pub fn build_forest_config(
    config: &dyn ConfigPort,
    params: &PredictArgs,
) -> Result<ForestConfig, MacrossError> {
    let defaults = ForestConfig::default();

    let n_trees = match params.trees {
        Some(v) => v,
        None => get_usize(config, "predict", "trees", defaults.n_trees)?,
    };
    validate_window("predict", "trees", n_trees)?;

    let seed = match params.seed {
        Some(v) => v,
        None => {
            let raw = config.get_int("predict", "seed", defaults.seed as i64)?;
            u64::try_from(raw).map_err(|_| MacrossError::ConfigInvalid {
                section: "predict".into(),
                key: "seed".into(),
                reason: "seed must be non-negative".into(),
            })?
        }
    };

    let max_depth = match get_usize(config, "predict", "max_depth", 0)? {
        0 => None,
        depth => Some(depth),
    };

    Ok(ForestConfig {
        n_trees,
        max_depth,
        seed,
        ..defaults
    })
}

pub fn ohlc_pipeline(port: &dyn DataPort, chart: &ChartConfig) -> Result<Vec<Candle>, MacrossError> {
    let bars = port.fetch_ohlcv(&chart.symbol, &chart.period, &chart.interval)?;
    tracing::info!("Loaded {} bars for {}", bars.len(), chart.symbol);
    Ok(candles(&bars))
}

pub fn sma_pipeline(
    port: &dyn DataPort,
    chart: &ChartConfig,
) -> Result<Vec<LinePoint>, MacrossError> {
    let bars = port.fetch_ohlcv(&chart.symbol, &chart.period, &chart.interval)?;
    tracing::info!("Loaded {} bars for {}", bars.len(), chart.symbol);
    Ok(sma_overlay(&bars, chart.sma_window))
}

pub fn backtest_pipeline(
    port: &dyn DataPort,
    bt_config: &BacktestConfig,
) -> Result<Outcome<BacktestReport>, MacrossError> {
    let bars = port.fetch_ohlcv(&bt_config.symbol, &bt_config.period, &bt_config.interval)?;
    tracing::info!("Loaded {} bars for {}", bars.len(), bt_config.symbol);

    match run_backtest(&bars, bt_config) {
        Ok(result) => {
            tracing::info!(
                "Backtest complete: {} trades, final equity {:.4}",
                result.metrics.trade_count,
                result.metrics.last_equity
            );
            Ok(Outcome::Completed(BacktestReport::new(bt_config, &result)))
        }
        Err(failure) => {
            tracing::warn!("Backtest produced no result: {}", failure);
            Ok(Outcome::Failed(FailureRecord::new(
                &bt_config.symbol,
                &bt_config.period,
                &bt_config.interval,
                failure,
            )))
        }
    }
}

pub fn predict_pipeline(
    port: &dyn DataPort,
    predict_config: &PredictConfig,
    model: &mut dyn Regressor,
) -> Result<Outcome<PredictionReport>, MacrossError> {
    let bars = port.fetch_ohlcv(
        &predict_config.symbol,
        &predict_config.period,
        &predict_config.interval,
    )?;
    tracing::info!("Loaded {} bars for {}", bars.len(), predict_config.symbol);

    let training = match prepare_training(&bars, predict_config) {
        Ok(training) => training,
        Err(failure) => {
            tracing::warn!("Prediction produced no result: {}", failure);
            return Ok(Outcome::Failed(FailureRecord::new(
                &predict_config.symbol,
                &predict_config.period,
                &predict_config.interval,
                failure,
            )));
        }
    };

    tracing::info!("Training on {} rows", training.train.len());
    let report = predict_signal(&training, predict_config, model)?;
    tracing::info!(
        "Predicted return {:.5} -> {:?}",
        report.predicted_return,
        report.signal
    );
    Ok(Outcome::Completed(report))
}
