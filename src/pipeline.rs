//! The daily run: collect → analyze → render.

use crate::analysis::Analyzer;
use crate::api::{self, CoinGeckoClient, EtherscanClient, NewsApiClient, YahooClient};
use crate::collectors::{CryptoCollector, NewsCollector, OnChainCollector, TradFiCollector};
use crate::config::{Config, Credentials};
use crate::llm::{ChatClient, ChatConfig};
use crate::models::{MarketData, Report};
use crate::report::Reporter;
use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

const RULE_WIDTH: usize = 70;

/// A written report and where it went.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub path: PathBuf,
}

pub struct Pipeline {
    tradfi: TradFiCollector,
    crypto: CryptoCollector,
    onchain: OnChainCollector,
    news: NewsCollector,
    analyzer: Analyzer,
    reporter: Reporter,
}

impl Pipeline {
    pub fn new(
        tradfi: TradFiCollector,
        crypto: CryptoCollector,
        onchain: OnChainCollector,
        news: NewsCollector,
        analyzer: Analyzer,
        reporter: Reporter,
    ) -> Self {
        Self {
            tradfi,
            crypto,
            onchain,
            news,
            analyzer,
            reporter,
        }
    }

    /// Wire the production HTTP clients from configuration.
    pub fn from_config(
        config: &Config,
        credentials: &Credentials,
        show_progress: bool,
    ) -> Result<Self> {
        let sources = &config.sources;
        // One client, one timeout, shared by every data source
        let http =
            api::http_client(sources.timeout_seconds).context("Failed to create HTTP client")?;

        let coin_market = Arc::new(CoinGeckoClient::new(http.clone(), &sources.coingecko_url));
        let explorer = Arc::new(EtherscanClient::new(
            http.clone(),
            &sources.etherscan_url,
            credentials.etherscan_api_key.clone(),
            sources.chain.chain_id,
        ));
        let news_api = Arc::new(NewsApiClient::new(
            http.clone(),
            &sources.newsapi_url,
            credentials.news_api_key.clone(),
        ));
        let price_history = Arc::new(YahooClient::new(http, &sources.yahoo_url));

        // The LLM gets its own client and a longer timeout
        let chat = ChatClient::new(ChatConfig {
            api_url: config.model.api_url.clone(),
            model_name: config.model.name.clone(),
            api_key: credentials.openai_api_key.clone(),
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
            timeout_seconds: config.model.timeout_seconds,
        })
        .context("Failed to create LLM client")?;

        Ok(Self::new(
            TradFiCollector::new(price_history, sources.tickers.clone()),
            CryptoCollector::new(coin_market.clone(), sources.coins.clone()),
            OnChainCollector::new(coin_market, explorer),
            NewsCollector::new(news_api, sources.news.clone()),
            Analyzer::new(Arc::new(chat), show_progress),
            Reporter::new(
                config.general.template.clone(),
                config.general.output_dir.clone(),
                config.general.format,
            ),
        ))
    }

    /// Run every collector in turn. Never fails; missing data stays empty.
    pub async fn collect(&self) -> MarketData {
        banner("COLLECTING MARKET DATA");

        println!("\n📊 Traditional Markets...");
        let tradfi = self.tradfi.collect().await;

        println!("\n💰 Crypto Markets...");
        let crypto = self.crypto.collect().await;

        println!("\n⛓️  On-Chain Data...");
        // ETH price is attempted even without explorer credentials
        let onchain = self.onchain.collect().await;

        println!("\n📰 News Headlines...");
        let news = self.news.collect().await;

        debug!(
            "Collected {} markets, {} coins, {} headlines",
            tradfi.len(),
            crypto.coins.len(),
            news.len()
        );

        MarketData {
            tradfi,
            crypto,
            onchain,
            news,
        }
    }

    /// Collect, analyze, and write the report.
    ///
    /// Returns `Ok(None)` when the analysis failed; nothing is written then.
    /// Only report-writing errors are returned as `Err`.
    pub async fn run(&self) -> Result<Option<RunOutcome>> {
        // Step 1: Collect from every source (never fails)
        let data = self.collect().await;

        // Step 2: Analyze, even when some or all sources came back empty
        banner("ANALYZING DATA WITH AI");
        let Some(analysis) = self.analyzer.analyze(&data).await else {
            error!("Analysis failed, no report generated");
            println!("❌ Failed to generate analysis");
            return Ok(None);
        };

        banner("TODAY'S MARKET ANALYSIS");
        println!("{}", analysis);

        // Step 3: Build and save the report
        let report = Report::new(data, analysis, Local::now());

        banner("GENERATING REPORT");
        let path = self.reporter.write(&report)?;

        Ok(Some(RunOutcome { report, path }))
    }
}

fn banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}\n{}\n{}", rule, title, rule);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{
        MockChainExplorer, MockCoinMarket, MockNewsSearch, MockPriceHistory, MockTextGenerator,
    };
    use crate::cli::OutputFormat;
    use crate::config::{NewsConfig, Ticker};
    use crate::llm::TextGenerator;
    use tempfile::TempDir;

    const TEMPLATE: &str = "<h1>{{ date }}</h1>{{ tradfi }}{{ analysis_html }}";

    struct Harness {
        dir: TempDir,
        generator: Arc<MockTextGenerator>,
    }

    impl Harness {
        fn new(generator: MockTextGenerator) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("template.html"), TEMPLATE).unwrap();
            Self {
                dir,
                generator: Arc::new(generator),
            }
        }

        fn output_dir(&self) -> PathBuf {
            self.dir.path().join("reports")
        }

        /// Pipeline where every data source fails or is unconfigured.
        fn failing_sources(&self) -> Pipeline {
            self.pipeline(
                MockPriceHistory::default(),
                MockCoinMarket::default(),
                MockChainExplorer::default(),
                MockNewsSearch::default(),
            )
        }

        fn pipeline(
            &self,
            prices: MockPriceHistory,
            coins: MockCoinMarket,
            explorer: MockChainExplorer,
            news: MockNewsSearch,
        ) -> Pipeline {
            let coins = Arc::new(coins);
            let generator: Arc<dyn TextGenerator> = self.generator.clone();

            Pipeline::new(
                TradFiCollector::new(
                    Arc::new(prices),
                    vec![Ticker {
                        name: "S&P 500".to_string(),
                        symbol: "^GSPC".to_string(),
                    }],
                ),
                CryptoCollector::new(coins.clone(), vec!["bitcoin".to_string()]),
                OnChainCollector::new(coins, Arc::new(explorer)),
                NewsCollector::new(Arc::new(news), NewsConfig::default()),
                Analyzer::new(generator, false),
                Reporter::new(
                    self.dir.path().join("template.html"),
                    self.output_dir(),
                    OutputFormat::Html,
                ),
            )
        }
    }

    #[tokio::test]
    async fn test_all_sources_empty_still_analyzes() {
        let harness = Harness::new(MockTextGenerator::replying("**Quiet day.**"));
        let pipeline = harness.failing_sources();

        let outcome = pipeline.run().await.unwrap().unwrap();

        assert_eq!(harness.generator.call_count(), 1);
        assert!(outcome.report.data.tradfi.is_empty());
        assert!(outcome.report.data.news.is_empty());
        assert!(outcome.path.exists());
        let html = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(html.contains("<strong>Quiet day.</strong>"));
    }

    #[tokio::test]
    async fn test_partial_data_reaches_analyzer() {
        let harness = Harness::new(MockTextGenerator::replying("ok"));
        let pipeline = harness.pipeline(
            MockPriceHistory::default().with_series("^GSPC", &[100.0, 105.0]),
            MockCoinMarket::default(),
            MockChainExplorer::default(),
            MockNewsSearch::default(),
        );

        let outcome = pipeline.run().await.unwrap().unwrap();

        let prompt = harness.generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("\"^GSPC\""));
        assert!(prompt.contains("\"change_percent\": 5.0"));
        assert_eq!(outcome.report.data.tradfi.len(), 1);
        assert!(outcome.report.data.crypto.is_empty());
    }

    #[tokio::test]
    async fn test_failed_analysis_writes_nothing() {
        let harness = Harness::new(MockTextGenerator::failing());
        let pipeline = harness.pipeline(
            MockPriceHistory::default().with_series("^GSPC", &[100.0, 105.0]),
            MockCoinMarket::default().with_quote("bitcoin", 60000.0, Some(1.0)),
            MockChainExplorer::default(),
            MockNewsSearch::default(),
        );

        let outcome = pipeline.run().await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(harness.generator.call_count(), 1);
        assert!(!harness.output_dir().exists());
    }

    #[tokio::test]
    async fn test_write_failure_is_an_error() {
        let harness = Harness::new(MockTextGenerator::replying("ok"));
        std::fs::remove_file(harness.dir.path().join("template.html")).unwrap();
        let pipeline = harness.failing_sources();

        assert!(pipeline.run().await.is_err());
    }

    #[tokio::test]
    async fn test_collect_gathers_every_source() {
        let harness = Harness::new(MockTextGenerator::failing());
        let pipeline = harness.pipeline(
            MockPriceHistory::default().with_series("^GSPC", &[100.0, 95.0]),
            MockCoinMarket::default()
                .with_quote("bitcoin", 60000.0, Some(-1.0))
                .with_quote("ethereum", 3000.0, Some(2.0)),
            MockChainExplorer {
                credentials: true,
                block: Some(7),
                ..Default::default()
            },
            MockNewsSearch {
                credentials: true,
                articles: Some(vec![MockNewsSearch::article("Headline", "Src", "https://x")]),
                ..Default::default()
            },
        );

        let data = pipeline.collect().await;

        assert_eq!(data.tradfi.points[0].change_percent, -5.0);
        assert_eq!(data.crypto.coins.len(), 1);
        assert_eq!(data.onchain.eth_price, Some(3000.0));
        assert_eq!(data.onchain.latest_block, Some(7));
        assert_eq!(data.news.len(), 1);
        assert_eq!(harness.generator.call_count(), 0);
    }

    #[test]
    fn test_from_config_builds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.output_dir = dir.path().to_path_buf();

        let pipeline = Pipeline::from_config(&config, &Credentials::default(), false);
        assert!(pipeline.is_ok());
    }
}
