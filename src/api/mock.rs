//! In-memory data sources for tests.

use super::{Article, ChainExplorer, CoinMarket, CoinQuote, NewsQuery, NewsSearch, PriceHistory};
use crate::error::{LlmError, SourceError, SourceResult};
use crate::llm::TextGenerator;
use crate::models::{GasPriceTiers, GlobalMarketStat};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Price history keyed by symbol. Unknown symbols fail.
#[derive(Default)]
pub struct MockPriceHistory {
    series: HashMap<String, Vec<f64>>,
    pub calls: AtomicUsize,
}

impl MockPriceHistory {
    pub fn with_series(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.series.insert(symbol.to_string(), closes.to_vec());
        self
    }
}

#[async_trait]
impl PriceHistory for MockPriceHistory {
    async fn daily_closes(&self, symbol: &str) -> SourceResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| SourceError::NoData(symbol.to_string()))
    }
}

/// Coin quotes and global stats. `None` makes the matching call fail.
#[derive(Default)]
pub struct MockCoinMarket {
    quotes: Option<HashMap<String, CoinQuote>>,
    global: Option<GlobalMarketStat>,
    pub price_calls: AtomicUsize,
    pub global_calls: AtomicUsize,
}

impl MockCoinMarket {
    pub fn with_quote(mut self, id: &str, usd: f64, change: Option<f64>) -> Self {
        self.quotes.get_or_insert_with(HashMap::new).insert(
            id.to_string(),
            CoinQuote {
                usd: Some(usd),
                usd_market_cap: Some(usd * 1_000_000.0),
                usd_24h_vol: Some(usd * 10_000.0),
                usd_24h_change: change,
            },
        );
        self
    }

    /// Quote present in the response but missing every field.
    pub fn with_empty_quote(mut self, id: &str) -> Self {
        self.quotes
            .get_or_insert_with(HashMap::new)
            .insert(id.to_string(), CoinQuote::default());
        self
    }

    pub fn with_global(mut self, total_market_cap: f64, btc_dominance: f64) -> Self {
        self.global = Some(GlobalMarketStat {
            total_market_cap,
            btc_dominance,
        });
        self
    }
}

#[async_trait]
impl CoinMarket for MockCoinMarket {
    async fn simple_prices(&self, ids: &[String]) -> SourceResult<HashMap<String, CoinQuote>> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        let quotes = self
            .quotes
            .as_ref()
            .ok_or_else(|| SourceError::Api("rate limited".to_string()))?;

        Ok(quotes
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, quote)| (id.clone(), quote.clone()))
            .collect())
    }

    async fn global_stats(&self) -> SourceResult<GlobalMarketStat> {
        self.global_calls.fetch_add(1, Ordering::SeqCst);
        self.global
            .clone()
            .ok_or_else(|| SourceError::Api("global unavailable".to_string()))
    }
}

/// Block explorer with optional gas and block answers.
#[derive(Default)]
pub struct MockChainExplorer {
    pub credentials: bool,
    pub gas: Option<GasPriceTiers>,
    pub block: Option<u64>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ChainExplorer for MockChainExplorer {
    fn has_credentials(&self) -> bool {
        self.credentials
    }

    async fn gas_oracle(&self) -> SourceResult<GasPriceTiers> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gas
            .ok_or_else(|| SourceError::Api("NOTOK".to_string()))
    }

    async fn latest_block(&self) -> SourceResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.block
            .ok_or_else(|| SourceError::Malformed("no result".to_string()))
    }
}

/// Headline search. `articles: None` makes the call fail.
#[derive(Default)]
pub struct MockNewsSearch {
    pub credentials: bool,
    pub articles: Option<Vec<Article>>,
    pub calls: AtomicUsize,
    pub last_query: Mutex<Option<NewsQuery>>,
}

impl MockNewsSearch {
    pub fn article(title: &str, source: &str, url: &str) -> Article {
        Article {
            source: super::newsapi::ArticleSource {
                name: Some(source.to_string()),
            },
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            published_at: Some("2024-03-07T12:00:00Z".to_string()),
        }
    }
}

#[async_trait]
impl NewsSearch for MockNewsSearch {
    fn has_credentials(&self) -> bool {
        self.credentials
    }

    async fn search(&self, query: &NewsQuery) -> SourceResult<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        self.articles
            .clone()
            .ok_or_else(|| SourceError::Api("rateLimited".to_string()))
    }
}

/// Canned model reply. `reply: None` makes generation fail.
#[derive(Default)]
pub struct MockTextGenerator {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
}

impl MockTextGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply.clone().ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
