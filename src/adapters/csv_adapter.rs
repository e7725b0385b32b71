//! CSV file data adapter.
//!
//! One file per symbol and interval, `<dir>/<SYMBOL>_<interval>.csv`, with a
//! `date,open,high,low,close,volume` header. Prices are taken as already
//! adjusted.

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::{OhlcvBar, normalize};
use crate::domain::period::Lookback;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }
}

/// `None` for an empty, `null` or non-finite field.
fn parse_price(field: Option<&str>, name: &str) -> Result<Option<f64>, MacrossError> {
    let raw = field.unwrap_or("").trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(|e| MacrossError::DataSource {
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })?;
    Ok(value.is_finite().then_some(value))
}

fn parse_record(record: &csv::StringRecord) -> Result<Option<OhlcvBar>, MacrossError> {
    let date_str = record.get(0).ok_or_else(|| MacrossError::DataSource {
        reason: "missing date column".into(),
    })?;
    let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
        MacrossError::DataSource {
            reason: format!("invalid date '{}': {}", date_str, e),
        }
    })?;

    let open = parse_price(record.get(1), "open")?;
    let high = parse_price(record.get(2), "high")?;
    let low = parse_price(record.get(3), "low")?;
    let close = parse_price(record.get(4), "close")?;
    let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
        return Ok(None);
    };

    // Volume is optional; some weekly and monthly exports leave it blank.
    let volume = parse_price(record.get(5), "volume")?.unwrap_or(0.0) as i64;

    Ok(Some(OhlcvBar {
        date,
        open,
        high,
        low,
        close,
        volume,
    }))
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, MacrossError> {
        let lookback: Lookback = period.parse().map_err(|reason| MacrossError::DataSource {
            reason: format!("period '{}': {}", period, reason),
        })?;

        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| MacrossError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| MacrossError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            match parse_record(&record)? {
                Some(bar) => bars.push(bar),
                None => dropped += 1,
            }
        }

        let mut bars = normalize(bars);
        if let Some(newest) = bars.last().map(|b| b.date) {
            if let Some(start) = lookback.start_date(newest) {
                bars.retain(|b| b.date >= start);
            }
        }

        tracing::debug!(
            path = %path.display(),
            bars = bars.len(),
            dropped,
            "loaded CSV bars"
        );
        Ok(bars)
    }
}
