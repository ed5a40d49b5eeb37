//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.marketbrief.toml` files, plus API credentials from the environment.

use crate::api::{coingecko, etherscan, newsapi, yahoo};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".marketbrief.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Data source settings.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// HTML template used for rendering.
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            template: default_template(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_template() -> PathBuf {
    PathBuf::from("templates/daily_report.html")
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_model_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.68
}

fn default_max_tokens() -> u32 {
    500
}

fn default_model_timeout() -> u64 {
    60
}

/// A tracked TradFi instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Display name.
    pub name: String,
    /// Yahoo Finance symbol.
    pub symbol: String,
}

impl Ticker {
    fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Timeout applied to every data-source request, in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u64,

    /// Coin ids tracked by the crypto collector.
    #[serde(default = "default_coins")]
    pub coins: Vec<String>,

    #[serde(default = "default_yahoo_url")]
    pub yahoo_url: String,

    #[serde(default = "default_coingecko_url")]
    pub coingecko_url: String,

    #[serde(default = "default_etherscan_url")]
    pub etherscan_url: String,

    #[serde(default = "default_newsapi_url")]
    pub newsapi_url: String,

    /// Block explorer settings.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Headline search settings.
    #[serde(default)]
    pub news: NewsConfig,

    /// Instruments tracked by the TradFi collector, in display order.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<Ticker>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_source_timeout(),
            coins: default_coins(),
            yahoo_url: default_yahoo_url(),
            coingecko_url: default_coingecko_url(),
            etherscan_url: default_etherscan_url(),
            newsapi_url: default_newsapi_url(),
            chain: ChainConfig::default(),
            news: NewsConfig::default(),
            tickers: default_tickers(),
        }
    }
}

fn default_source_timeout() -> u64 {
    10
}

fn default_tickers() -> Vec<Ticker> {
    vec![
        Ticker::new("S&P 500", "^GSPC"),
        Ticker::new("Nasdaq", "^IXIC"),
        Ticker::new("Dow Jones", "^DJI"),
        Ticker::new("Gold", "GC=F"),
        Ticker::new("VIX", "^VIX"),
        Ticker::new("10Y Treasury", "^TNX"),
        Ticker::new("Dollar Index", "DX-Y.NYB"),
    ]
}

fn default_coins() -> Vec<String> {
    vec!["bitcoin", "ethereum", "solana", "cardano", "polkadot"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_yahoo_url() -> String {
    yahoo::DEFAULT_BASE_URL.to_string()
}

fn default_coingecko_url() -> String {
    coingecko::DEFAULT_BASE_URL.to_string()
}

fn default_etherscan_url() -> String {
    etherscan::DEFAULT_BASE_URL.to_string()
}

fn default_newsapi_url() -> String {
    newsapi::DEFAULT_BASE_URL.to_string()
}

/// Block explorer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// EVM chain id (1 = Ethereum mainnet).
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
        }
    }
}

fn default_chain_id() -> u64 {
    1
}

/// Headline search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsConfig {
    /// OR-combined search expression.
    #[serde(default = "default_keywords")]
    pub keywords: String,

    /// Number of headlines requested.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_language")]
    pub language: String,

    /// How far back to search, in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            page_size: default_page_size(),
            language: default_language(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

fn default_keywords() -> String {
    "bitcoin OR ethereum OR crypto OR stock market OR federal reserve".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_language() -> String {
    "en".to_string()
}

fn default_lookback_hours() -> u32 {
    24
}

/// API keys read from the environment. Never written to config files.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub etherscan_api_key: Option<String>,
}

impl Credentials {
    /// Read keys from the process environment. `.env` is loaded by
    /// `Args::parse_args` before this runs.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            news_api_key: std::env::var("NEWS_API_KEY").ok(),
            etherscan_api_key: std::env::var("ETHERSCAN_API_KEY").ok(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |key: &Option<String>| if key.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("news_api_key", &mask(&self.news_api_key))
            .field("etherscan_api_key", &mask(&self.etherscan_api_key))
            .finish()
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values the user actually passed on the command line override
    /// the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }
        if let Some(ref template) = args.template {
            self.general.template = template.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.llm_url {
            self.model.api_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(max_tokens) = args.max_tokens {
            self.model.max_tokens = max_tokens;
        }
        if let Some(timeout) = args.timeout {
            self.sources.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
