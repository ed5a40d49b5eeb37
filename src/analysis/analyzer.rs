//! Single-shot LLM analysis of the collected market data.

use super::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::llm::TextGenerator;
use crate::models::MarketData;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct Analyzer {
    generator: Arc<dyn TextGenerator>,
    show_progress: bool,
}

impl Analyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, show_progress: bool) -> Self {
        Self {
            generator,
            show_progress,
        }
    }

    /// Ask the model for the daily write-up.
    ///
    /// Makes exactly one request. Any failure is logged and yields `None`.
    pub async fn analyze(&self, data: &MarketData) -> Option<String> {
        let prompt = match build_prompt(data) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("❌ Failed to serialize market data: {}", e);
                return None;
            }
        };

        info!(
            "🤖 Sending data to {} for analysis...",
            self.generator.model_name()
        );
        let spinner = self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("waiting for analysis");
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });

        let result = self.generator.generate(SYSTEM_PROMPT, &prompt).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(text) => {
                info!("✅ AI analysis complete ({} chars)", text.len());
                Some(text)
            }
            Err(e) => {
                error!("❌ Error during AI analysis: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTextGenerator;
    use crate::models::{CryptoSnapshot, OnChainSummary, TradFiSnapshot};
    use chrono::Local;

    fn empty_data() -> MarketData {
        MarketData {
            tradfi: TradFiSnapshot::default(),
            crypto: CryptoSnapshot::default(),
            onchain: OnChainSummary::empty(Local::now()),
            news: vec![],
        }
    }

    #[tokio::test]
    async fn test_returns_reply_verbatim() {
        let reply = "**TODAY'S HEADLINE**\nStocks slipped; crypto shrugged.";
        let generator = Arc::new(MockTextGenerator::replying(reply));
        let analyzer = Analyzer::new(generator.clone(), false);

        let analysis = analyzer.analyze(&empty_data()).await;

        assert_eq!(analysis.as_deref(), Some(reply));
        assert_eq!(generator.call_count(), 1);
        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("ON-CHAIN DATA:"));
    }

    #[test]
    fn test_failure_yields_none() {
        let generator = Arc::new(MockTextGenerator::failing());
        let analyzer = Analyzer::new(generator.clone(), false);

        let analysis = tokio_test::block_on(analyzer.analyze(&empty_data()));

        assert!(analysis.is_none());
        // No retry after a failure.
        assert_eq!(generator.call_count(), 1);
    }
}
