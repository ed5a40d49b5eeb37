//! Yahoo Finance chart API client.

use super::{ensure_success, PriceHistory};
use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Daily closes from Yahoo's chart endpoint.
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
    /// Lookback window passed as `range`, e.g. "5d".
    range: String,
}

impl YahooClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            range: "5d".to_string(),
        }
    }

    fn chart_request(&self, symbol: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_symbol(symbol)
        );
        self.http
            .get(url)
            .query(&[("range", self.range.as_str()), ("interval", "1d")])
    }
}

#[async_trait]
impl PriceHistory for YahooClient {
    async fn daily_closes(&self, symbol: &str) -> SourceResult<Vec<f64>> {
        debug!("GET chart {} range={}", symbol, self.range);

        let response = self.chart_request(symbol).send().await?;
        let body: ChartResponse = ensure_success(response).await?.json().await?;

        parse_closes(symbol, body)
    }
}

fn parse_closes(symbol: &str, body: ChartResponse) -> SourceResult<Vec<f64>> {
    if let Some(error) = body.chart.error {
        return Err(SourceError::Api(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    let quote = body
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|data| data.indicators.quote.into_iter().next())
        .ok_or_else(|| SourceError::NoData(symbol.to_string()))?;

    Ok(quote.close.into_iter().flatten().collect())
}

/// Percent-encode the characters Yahoo symbols use that are not path-safe.
fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E").replace('=', "%3D")
}
