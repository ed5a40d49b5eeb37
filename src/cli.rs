//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values. Every flag is optional;
//! running with no arguments produces today's report with the defaults.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MarketBrief - daily TradFi + crypto market brief
///
/// Collects traditional market closes, crypto prices, on-chain data and
/// headlines, asks an LLM for a short write-up, and renders an HTML report.
///
/// API keys are read from the environment (or a .env file):
/// OPENAI_API_KEY, NEWS_API_KEY, ETHERSCAN_API_KEY.
///
/// Examples:
///   marketbrief
///   marketbrief --output-dir ./site --template ./my_template.html
///   marketbrief --format json
///   marketbrief --dry-run
///   marketbrief --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .marketbrief.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to write the report into [default: reports]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// HTML template to render [default: templates/daily_report.html]
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Report format (html, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// LLM model to use for the analysis [default: gpt-4o-mini]
    #[arg(short, long, env = "MARKETBRIEF_MODEL")]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, value_name = "URL", env = "MARKETBRIEF_LLM_URL")]
    pub llm_url: Option<String>,

    /// Sampling temperature for the analysis (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in the analysis
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Timeout for every data-source request, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Collect data and print it without calling the LLM or writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .marketbrief.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered HTML page (default)
    #[default]
    Html,
    /// Raw report data as JSON
    Json,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// `.env` is loaded first so the `env` fallbacks of `--model` and
    /// `--llm-url` can come from it.
    pub fn parse_args() -> Self {
        Self::parse_with_env(
            || {
                dotenvy::dotenv().ok();
            },
            std::env::args_os(),
        )
        .unwrap_or_else(|e| e.exit())
    }

    fn parse_with_env<I, T>(load_env: impl FnOnce(), args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        load_env();
        Self::try_parse_from(args)
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.llm_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("LLM URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if self.max_tokens == Some(0) {
            return Err("Max tokens must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
