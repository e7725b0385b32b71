//! Yahoo Finance chart API adapter.
//!
//! Requests `range=<period>&interval=<interval>` and auto-adjusts OHLC by the
//! `adjclose / close` ratio of each row. Rows missing any price are dropped;
//! a missing volume becomes 0.

use crate::domain::error::MacrossError;
use crate::domain::ohlcv::{OhlcvBar, normalize};
use crate::ports::data_port::DataPort;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, MacrossError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MacrossError::DataSource {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl DataPort for YahooAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, MacrossError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        tracing::info!(symbol, period, interval, "fetching bars from Yahoo");

        let response = self
            .client
            .get(&url)
            .query(&[("range", period), ("interval", interval)])
            .send()
            .map_err(|e| MacrossError::DataSource {
                reason: format!("request to {} failed: {}", url, e),
            })?;

        // Unknown symbols answer 404 with a chart error body.
        let status = response.status();
        let body = response.text().map_err(|e| MacrossError::DataSource {
            reason: format!("failed to read response body: {}", e),
        })?;
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(MacrossError::DataSource {
                reason: format!("HTTP {} from {}", status, url),
            });
        }

        let bars = parse_chart(&body)?;
        tracing::info!(symbol, bars = bars.len(), "fetched bars");
        Ok(bars)
    }
}

/// Decodes a chart API body into normalized bars.
pub fn parse_chart(body: &str) -> Result<Vec<OhlcvBar>, MacrossError> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| {
        MacrossError::DataSource {
            reason: format!("unexpected chart response: {}", e),
        }
    })?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(Vec::new());
        }
        return Err(MacrossError::DataSource {
            reason: format!("Yahoo API error: {} - {}", error.code, error.description),
        });
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = data
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose);

    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open, i),
            field(&quote.high, i),
            field(&quote.low, i),
            field(&quote.close, i),
        ) else {
            continue;
        };

        // Bar dates are in exchange local time.
        let Some(when) = DateTime::from_timestamp(ts + data.meta.gmtoffset, 0) else {
            continue;
        };

        let ratio = match &adjclose {
            Some(adj) => match field(adj, i) {
                Some(adj) if close != 0.0 => adj / close,
                _ => continue,
            },
            None => 1.0,
        };

        bars.push(OhlcvBar {
            date: when.date_naive(),
            open: open * ratio,
            high: high * ratio,
            low: low * ratio,
            close: close * ratio,
            volume: field(&quote.volume, i).unwrap_or(0.0) as i64,
        });
    }

    Ok(normalize(bars))
}
