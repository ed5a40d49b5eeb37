//! Traditional markets: indices, gold, rates, volatility, dollar.

use crate::api::PriceHistory;
use crate::config::Ticker;
use crate::error::{SourceError, SourceResult};
use crate::models::{MarketPoint, TradFiSnapshot};
use std::sync::Arc;
use tracing::{info, warn};

pub struct TradFiCollector {
    api: Arc<dyn PriceHistory>,
    tickers: Vec<Ticker>,
}

impl TradFiCollector {
    pub fn new(api: Arc<dyn PriceHistory>, tickers: Vec<Ticker>) -> Self {
        Self { api, tickers }
    }

    /// Fetch every configured ticker. Failed tickers are left out.
    pub async fn collect(&self) -> TradFiSnapshot {
        let mut points = Vec::with_capacity(self.tickers.len());

        for ticker in &self.tickers {
            match self.fetch_point(ticker).await {
                Ok(point) => {
                    info!(
                        "✅ {}: ${:.2} ({:+.2}%)",
                        point.name, point.price, point.change_percent
                    );
                    points.push(point);
                }
                Err(e) => warn!("❌ Error fetching {}: {}", ticker.name, e),
            }
        }

        TradFiSnapshot { points }
    }

    async fn fetch_point(&self, ticker: &Ticker) -> SourceResult<MarketPoint> {
        let closes = self.api.daily_closes(&ticker.symbol).await?;

        let &[.., previous, latest] = closes.as_slice() else {
            return Err(SourceError::NoData(format!(
                "{} (need two closes, got {})",
                ticker.symbol,
                closes.len()
            )));
        };

        MarketPoint::from_closes(&ticker.name, &ticker.symbol, previous, latest)
            .ok_or_else(|| SourceError::Malformed(format!("{} previous close is zero", ticker.symbol)))
    }
}
