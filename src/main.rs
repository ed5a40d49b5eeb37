//! MarketBrief - daily TradFi + crypto market brief
//!
//! A CLI tool that collects market closes, crypto prices, on-chain data
//! and headlines, asks an LLM for a short analysis, and renders the result
//! into a dated HTML report.
//!
//! Exit codes:
//!   0 - Report written (or dry run completed)
//!   1 - Analysis failed, or a runtime error (config, template, write, etc.)

mod analysis;
mod api;
mod cli;
mod collectors;
mod config;
mod error;
mod llm;
mod models;
mod pipeline;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, Credentials, CONFIG_FILE};
use pipeline::Pipeline;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments (after .env, for env-backed flags)
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("MarketBrief v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the daily report
    match run(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .marketbrief.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize tickers, coins, news keywords, and the model.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one daily report. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    debug!("Effective config: {:?}", config);

    // API keys never come from flags or the config file
    let credentials = Credentials::from_env();
    debug!("Credentials: {:?}", credentials);

    if credentials.openai_api_key.is_none() && !args.dry_run {
        warn!("⚠️  OPENAI_API_KEY is not set, the analysis step will fail");
    }

    // Wire up clients, collectors, analyzer and reporter
    let pipeline = Pipeline::from_config(&config, &credentials, !args.quiet)?;

    // Handle --dry-run: collect and print, no LLM call
    if args.dry_run {
        return handle_dry_run(&pipeline).await;
    }

    println!("🚀 Starting daily market report");
    println!("   Model: {}", config.model.name);
    println!("   Output: {}", config.general.output_dir.display());

    // Collect, analyze, render
    let Some(outcome) = pipeline.run().await? else {
        eprintln!("\n❌ No report generated: the analysis step failed.");
        return Ok(1);
    };

    // Print summary
    println!(
        "\n✅ Report for {} saved to: {}",
        outcome.report.date_label(),
        outcome.path.display()
    );
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    Ok(0)
}

/// Handle --dry-run: collect everything, print it, exit without an LLM call.
async fn handle_dry_run(pipeline: &Pipeline) -> Result<i32> {
    println!("\n🔍 Dry run: collecting data (no LLM call, no report)...");

    let data = pipeline.collect().await;
    let json = serde_json::to_string_pretty(&data).context("Failed to serialize market data")?;
    println!("\n{}", json);

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
