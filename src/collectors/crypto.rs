//! Crypto markets: per-coin quotes plus global market stats.

use crate::api::{CoinMarket, CoinQuote};
use crate::models::{round2, CoinSnapshot, CryptoSnapshot, Direction};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct CryptoCollector {
    api: Arc<dyn CoinMarket>,
    coins: Vec<String>,
}

impl CryptoCollector {
    pub fn new(api: Arc<dyn CoinMarket>, coins: Vec<String>) -> Self {
        Self { api, coins }
    }

    /// One batched price call, then an independent global-stats call.
    pub async fn collect(&self) -> CryptoSnapshot {
        let quotes = match self.api.simple_prices(&self.coins).await {
            Ok(quotes) => quotes,
            Err(e) => {
                error!("❌ Error fetching crypto prices: {}", e);
                return CryptoSnapshot::default();
            }
        };

        let coins: Vec<CoinSnapshot> = self
            .coins
            .iter()
            .filter_map(|id| {
                let snapshot = quotes.get(id).and_then(|quote| coin_snapshot(id, quote));
                if snapshot.is_none() {
                    warn!("⚠️  No price for {}", id);
                }
                snapshot
            })
            .inspect(|coin| {
                info!(
                    "✅ {}: ${:.2} ({:+.2}%)",
                    coin.id, coin.price, coin.change_24h
                )
            })
            .collect();

        let global = match self.api.global_stats().await {
            Ok(stat) => {
                info!(
                    "📊 Total Market Cap: ${:.2}T | BTC Dominance: {:.1}%",
                    stat.total_market_cap / 1e12,
                    stat.btc_dominance
                );
                Some(stat)
            }
            Err(e) => {
                warn!("⚠️  Could not fetch global data (non-critical): {}", e);
                None
            }
        };

        CryptoSnapshot { coins, global }
    }
}

/// `None` when the quote carries no USD price.
fn coin_snapshot(id: &str, quote: &CoinQuote) -> Option<CoinSnapshot> {
    let price = quote.usd?;
    let change_24h = round2(quote.usd_24h_change.unwrap_or(0.0));

    Some(CoinSnapshot {
        id: id.to_string(),
        price: round2(price),
        change_24h,
        market_cap: quote.usd_market_cap.unwrap_or(0.0),
        volume_24h: quote.usd_24h_vol.unwrap_or(0.0),
        direction: Direction::from_change(change_24h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockCoinMarket;
    use std::sync::atomic::Ordering;

    fn coins(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_missing_coin_is_excluded() {
        let api = MockCoinMarket::default()
            .with_quote("bitcoin", 62400.123, Some(-2.137))
            .with_quote("ethereum", 3950.0, Some(0.4))
            .with_global(2.4e12, 54.2);
        let collector =
            CryptoCollector::new(Arc::new(api), coins(&["bitcoin", "ethereum", "solana"]));

        let snapshot = collector.collect().await;

        assert_eq!(snapshot.coins.len(), 2);
        assert!(snapshot.get("solana").is_none());
        let btc = snapshot.get("bitcoin").unwrap();
        assert_eq!(btc.price, 62400.12);
        assert_eq!(btc.change_24h, -2.14);
        assert_eq!(btc.direction, Direction::Down);
        assert_eq!(snapshot.global.as_ref().unwrap().btc_dominance, 54.2);
    }

    #[tokio::test]
    async fn test_unrequested_coin_never_appears() {
        let api = MockCoinMarket::default()
            .with_quote("bitcoin", 1.0, Some(1.0))
            .with_quote("dogecoin", 0.1, Some(1.0));
        let collector = CryptoCollector::new(Arc::new(api), coins(&["bitcoin"]));

        let snapshot = collector.collect().await;
        assert!(snapshot.get("dogecoin").is_none());
        assert_eq!(snapshot.coins.len(), 1);
    }

    #[tokio::test]
    async fn test_global_failure_keeps_coins() {
        let api = MockCoinMarket::default().with_quote("bitcoin", 60000.0, Some(1.5));
        let collector = CryptoCollector::new(Arc::new(api), coins(&["bitcoin"]));

        let snapshot = collector.collect().await;

        assert_eq!(snapshot.coins.len(), 1);
        assert!(snapshot.global.is_none());
    }

    #[tokio::test]
    async fn test_price_failure_returns_empty() {
        let api = Arc::new(MockCoinMarket::default().with_global(2.4e12, 54.2));
        let collector = CryptoCollector::new(api.clone(), coins(&["bitcoin"]));

        let snapshot = collector.collect().await;

        assert!(snapshot.is_empty());
        assert_eq!(api.global_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quote_without_price_is_dropped() {
        let api = MockCoinMarket::default()
            .with_quote("bitcoin", 62000.0, Some(1.0))
            .with_empty_quote("polkadot");
        let collector = CryptoCollector::new(Arc::new(api), coins(&["bitcoin", "polkadot"]));

        let snapshot = collector.collect().await;

        assert_eq!(snapshot.coins.len(), 1);
        assert!(snapshot.get("bitcoin").is_some());
        assert!(snapshot.get("polkadot").is_none());
    }

    #[tokio::test]
    async fn test_missing_change_defaults_to_flat() {
        let api = MockCoinMarket::default().with_quote("cardano", 0.45, None);
        let collector = CryptoCollector::new(Arc::new(api), coins(&["cardano"]));

        let snapshot = collector.collect().await;
        let ada = snapshot.get("cardano").unwrap();
        assert_eq!(ada.change_24h, 0.0);
        assert_eq!(ada.direction, Direction::Flat);
    }
}
