//! On-chain activity: ETH price, gas tiers, latest block.

use crate::api::{ChainExplorer, CoinMarket};
use crate::error::{SourceError, SourceResult};
use crate::models::OnChainSummary;
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

const ETH_ID: &str = "ethereum";

/// Combines three independent sub-fetches into one summary.
///
/// ETH price comes from the coin market source rather than the explorer;
/// gas and block height come from the explorer.
pub struct OnChainCollector {
    prices: Arc<dyn CoinMarket>,
    explorer: Arc<dyn ChainExplorer>,
}

impl OnChainCollector {
    pub fn new(prices: Arc<dyn CoinMarket>, explorer: Arc<dyn ChainExplorer>) -> Self {
        Self { prices, explorer }
    }

    /// Always returns a summary; each slot is `None` when its fetch failed.
    pub async fn collect(&self) -> OnChainSummary {
        let mut summary = OnChainSummary::empty(Local::now());

        match self.eth_price().await {
            Ok(price) => {
                info!("💰 ETH Price: ${:.2}", price);
                summary.eth_price = Some(price);
            }
            Err(e) => warn!("⚠️  Could not fetch ETH price: {}", e),
        }

        if !self.explorer.has_credentials() {
            warn!("⚠️  No ETHERSCAN_API_KEY set, skipping gas and block data");
            return summary;
        }

        match self.explorer.gas_oracle().await {
            Ok(gas) => {
                info!(
                    "⛽ Gas (Gwei): Safe={}, Standard={}, Fast={}",
                    gas.safe, gas.propose, gas.fast
                );
                summary.gas_prices = Some(gas);
            }
            Err(e) => warn!("⚠️  Error fetching gas price: {}", e),
        }

        match self.explorer.latest_block().await {
            Ok(block) => {
                info!("✅ Latest block: {}", block);
                summary.latest_block = Some(block);
            }
            Err(e) => warn!("⚠️  Error fetching block: {}", e),
        }

        summary
    }

    async fn eth_price(&self) -> SourceResult<f64> {
        let quotes = self.prices.simple_prices(&[ETH_ID.to_string()]).await?;
        quotes
            .get(ETH_ID)
            .and_then(|quote| quote.usd)
            .ok_or_else(|| SourceError::NoData(ETH_ID.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockChainExplorer, MockCoinMarket};
    use crate::models::GasPriceTiers;
    use std::sync::atomic::Ordering;

    fn gas() -> GasPriceTiers {
        GasPriceTiers {
            safe: 10.0,
            propose: 12.0,
            fast: 15.0,
        }
    }

    #[tokio::test]
    async fn test_all_slots_filled() {
        let prices = MockCoinMarket::default().with_quote("ethereum", 3950.0, Some(0.4));
        let explorer = MockChainExplorer {
            credentials: true,
            gas: Some(gas()),
            block: Some(19_495_500),
            ..Default::default()
        };
        let collector = OnChainCollector::new(Arc::new(prices), Arc::new(explorer));

        let summary = collector.collect().await;

        assert_eq!(summary.eth_price, Some(3950.0));
        assert_eq!(summary.gas_prices, Some(gas()));
        assert_eq!(summary.latest_block, Some(19_495_500));
    }

    #[tokio::test]
    async fn test_explorer_failures_keep_summary() {
        let prices = MockCoinMarket::default().with_quote("ethereum", 3950.0, None);
        let explorer = MockChainExplorer {
            credentials: true,
            ..Default::default()
        };
        let collector = OnChainCollector::new(Arc::new(prices), Arc::new(explorer));

        let summary = collector.collect().await;

        assert_eq!(summary.eth_price, Some(3950.0));
        assert!(summary.gas_prices.is_none());
        assert!(summary.latest_block.is_none());
    }

    #[tokio::test]
    async fn test_eth_quote_without_price() {
        let prices = MockCoinMarket::default().with_empty_quote("ethereum");
        let collector = OnChainCollector::new(
            Arc::new(prices),
            Arc::new(MockChainExplorer::default()),
        );

        let summary = collector.collect().await;
        assert!(summary.eth_price.is_none());
    }

    #[tokio::test]
    async fn test_every_source_failing() {
        let collector = OnChainCollector::new(
            Arc::new(MockCoinMarket::default()),
            Arc::new(MockChainExplorer {
                credentials: true,
                ..Default::default()
            }),
        );

        let summary = collector.collect().await;
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_gas_failure_does_not_block_height() {
        let explorer = MockChainExplorer {
            credentials: true,
            gas: None,
            block: Some(42),
            ..Default::default()
        };
        let collector =
            OnChainCollector::new(Arc::new(MockCoinMarket::default()), Arc::new(explorer));

        let summary = collector.collect().await;
        assert!(summary.eth_price.is_none());
        assert_eq!(summary.latest_block, Some(42));
    }

    #[tokio::test]
    async fn test_missing_explorer_key_skips_explorer() {
        let prices = Arc::new(MockCoinMarket::default().with_quote("ethereum", 3950.0, None));
        let explorer = Arc::new(MockChainExplorer {
            credentials: false,
            gas: Some(gas()),
            block: Some(1),
            ..Default::default()
        });
        let collector = OnChainCollector::new(prices.clone(), explorer.clone());

        let summary = collector.collect().await;

        assert_eq!(explorer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(prices.price_calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.eth_price, Some(3950.0));
        assert!(summary.gas_prices.is_none());
    }
}
