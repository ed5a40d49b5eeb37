//! CoinGecko public API client.

use super::{ensure_success, CoinMarket};
use crate::error::{SourceError, SourceResult};
use crate::models::GlobalMarketStat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// One entry of `/simple/price` with `vs_currencies=usd`.
///
/// Every field is optional so one incomplete coin cannot fail the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
    #[serde(default)]
    pub usd_24h_vol: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    total_market_cap: HashMap<String, f64>,
    market_cap_percentage: HashMap<String, f64>,
}

pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn simple_price_request(&self, ids: &[String]) -> reqwest::RequestBuilder {
        let ids = ids.join(",");
        let request = self.http.get(self.endpoint("simple/price")).query(&[
            ("ids", ids.as_str()),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
            ("include_market_cap", "true"),
            ("include_24hr_vol", "true"),
        ]);
        request
    }
}

#[async_trait]
impl CoinMarket for CoinGeckoClient {
    async fn simple_prices(&self, ids: &[String]) -> SourceResult<HashMap<String, CoinQuote>> {
        debug!("GET simple/price ids={}", ids.join(","));

        let response = self.simple_price_request(ids).send().await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn global_stats(&self) -> SourceResult<GlobalMarketStat> {
        let url = self.endpoint("global");
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let body: GlobalResponse = ensure_success(response).await?.json().await?;

        global_from_data(body.data)
    }
}

fn global_from_data(data: GlobalData) -> SourceResult<GlobalMarketStat> {
    let total_market_cap = data
        .total_market_cap
        .get("usd")
        .copied()
        .ok_or_else(|| SourceError::Malformed("total_market_cap.usd missing".to_string()))?;
    let btc_dominance = data
        .market_cap_percentage
        .get("btc")
        .copied()
        .ok_or_else(|| SourceError::Malformed("market_cap_percentage.btc missing".to_string()))?;

    Ok(GlobalMarketStat {
        total_market_cap,
        btc_dominance,
    })
}
