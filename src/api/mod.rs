//! Third-party market data APIs.
//!
//! Each collector talks to its upstream through one of the traits below.
//! The reqwest-backed clients live in the submodules; tests swap in the
//! in-memory fakes from `mock`.

pub mod coingecko;
pub mod etherscan;
pub mod newsapi;
pub mod yahoo;

#[cfg(test)]
pub mod mock;

pub use coingecko::{CoinGeckoClient, CoinQuote};
pub use etherscan::EtherscanClient;
pub use newsapi::{Article, NewsApiClient, NewsQuery};
pub use yahoo::YahooClient;

use crate::error::{SourceError, SourceResult};
use crate::models::{GasPriceTiers, GlobalMarketStat};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Daily price history for exchange-traded instruments.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Recent daily closes, oldest first, with missing sessions dropped.
    async fn daily_closes(&self, symbol: &str) -> SourceResult<Vec<f64>>;
}

/// Spot prices and whole-market statistics for crypto assets.
#[async_trait]
pub trait CoinMarket: Send + Sync {
    /// USD quotes for the given coin ids. Unknown ids are absent from the map.
    async fn simple_prices(&self, ids: &[String]) -> SourceResult<HashMap<String, CoinQuote>>;

    /// Total market cap and BTC dominance.
    async fn global_stats(&self) -> SourceResult<GlobalMarketStat>;
}

/// Block explorer for gas and block height.
#[async_trait]
pub trait ChainExplorer: Send + Sync {
    fn has_credentials(&self) -> bool;

    async fn gas_oracle(&self) -> SourceResult<GasPriceTiers>;

    async fn latest_block(&self) -> SourceResult<u64>;
}

/// Headline search.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    fn has_credentials(&self) -> bool;

    async fn search(&self, query: &NewsQuery) -> SourceResult<Vec<Article>>;
}

/// Build the HTTP client shared by all data sources.
///
/// Every request made through it carries the same timeout.
pub fn http_client(timeout_seconds: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("marketbrief/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Turn a non-success response into `SourceError::Status`.
pub(crate) async fn ensure_success(response: reqwest::Response) -> SourceResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Status {
        status,
        body: truncate(&body, 200),
    })
}

/// Treat empty or whitespace-only keys as missing.
pub(crate) fn non_empty(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
