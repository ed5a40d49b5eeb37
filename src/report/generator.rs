//! HTML and JSON report generation.
//!
//! The HTML report is the configured template with its placeholders filled
//! from the report: formatted date and time, one HTML fragment per data
//! section, the analysis converted from markdown, and the raw data as JSON.

use super::template::{escape_html, render};
use crate::cli::OutputFormat;
use crate::models::{CryptoSnapshot, NewsItem, OnChainSummary, Report, TradFiSnapshot};
use anyhow::{Context, Result};
use pulldown_cmark::{html, Event, Options, Parser};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Writes reports into an output directory.
#[derive(Debug, Clone)]
pub struct Reporter {
    template_path: PathBuf,
    output_dir: PathBuf,
    format: OutputFormat,
}

impl Reporter {
    pub fn new(template_path: PathBuf, output_dir: PathBuf, format: OutputFormat) -> Self {
        Self {
            template_path,
            output_dir,
            format,
        }
    }

    /// Path the report will be written to: `<output_dir>/report_YYYYMMDD.<ext>`.
    ///
    /// Same-day runs map to the same path and overwrite each other.
    pub fn report_path(&self, report: &Report) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", report.file_stem(), self.format.extension()))
    }

    /// Render and write the report, returning its path.
    pub fn write(&self, report: &Report) -> Result<PathBuf> {
        let content = match self.format {
            OutputFormat::Html => {
                // Read template
                let template = std::fs::read_to_string(&self.template_path).with_context(|| {
                    format!("Failed to read template {}", self.template_path.display())
                })?;
                generate_html_report(report, &template)?
            }
            OutputFormat::Json => generate_json_report(report)?,
        };

        // Only create the directory once there is something to write
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let path = self.report_path(report);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        info!("✅ Report saved to: {}", path.display());
        Ok(path)
    }
}

/// Fill the template from a report.
pub fn generate_html_report(report: &Report, template: &str) -> Result<String> {
    let data_json = serde_json::to_string(&report.data)
        .context("Failed to serialize report data")?
        // Keep the JSON from closing its <script> element.
        .replace("</", "<\\/");

    // Every value below is already HTML (escaped text or generated markup)
    let values: HashMap<&str, String> = [
        ("date", escape_html(&report.date_label())),
        ("time", escape_html(&report.time_label())),
        (
            "generated_at",
            report.generated_at.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        ),
        ("tradfi", generate_tradfi_section(&report.data.tradfi)),
        ("crypto", generate_crypto_section(&report.data.crypto)),
        ("onchain", generate_onchain_section(&report.data.onchain)),
        ("news", generate_news_section(&report.data.news)),
        ("analysis_html", markdown_to_html(&report.analysis)),
        ("data_json", data_json),
    ]
    .into_iter()
    .collect();

    Ok(render(template, &values))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Convert the model's lightly marked-up prose into HTML.
///
/// Raw HTML in the text is escaped, never passed through: the model can
/// quote third-party headlines back verbatim.
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

fn empty_state(message: &str) -> String {
    format!("<p class=\"empty\">{}</p>\n", escape_html(message))
}

/// Generate the traditional markets table.
fn generate_tradfi_section(tradfi: &TradFiSnapshot) -> String {
    if tradfi.is_empty() {
        return empty_state("Traditional market data unavailable.");
    }

    let mut section = String::new();
    section.push_str("<table class=\"markets\">\n");
    section.push_str("<thead><tr><th>Market</th><th>Price</th><th>Change</th></tr></thead>\n<tbody>\n");

    for point in &tradfi.points {
        section.push_str(&format!(
            "<tr><td title=\"{}\">{}</td><td>{}</td><td class=\"{}\">{} {:+.2}%</td></tr>\n",
            escape_html(&point.symbol),
            escape_html(&point.name),
            format_number(point.price, 2),
            point.direction.css_class(),
            point.direction.arrow(),
            point.change_percent
        ));
    }

    section.push_str("</tbody>\n</table>\n");
    section
}

/// Generate the crypto table plus global stats.
fn generate_crypto_section(crypto: &CryptoSnapshot) -> String {
    if crypto.is_empty() {
        return empty_state("Crypto market data unavailable.");
    }

    let mut section = String::new();

    if !crypto.coins.is_empty() {
        section.push_str("<table class=\"markets\">\n");
        section.push_str(
            "<thead><tr><th>Coin</th><th>Price</th><th>24h</th><th>Market Cap</th><th>Volume</th></tr></thead>\n<tbody>\n",
        );

        for coin in &crypto.coins {
            section.push_str(&format!(
                "<tr><td>{}</td><td>${}</td><td class=\"{}\">{} {:+.2}%</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&title_case(&coin.id)),
                format_number(coin.price, 2),
                coin.direction.css_class(),
                coin.direction.arrow(),
                coin.change_24h,
                format_compact_usd(coin.market_cap),
                format_compact_usd(coin.volume_24h)
            ));
        }

        section.push_str("</tbody>\n</table>\n");
    }

    // Global stats fetch independently of the coin table
    if let Some(ref global) = crypto.global {
        section.push_str(&format!(
            "<p class=\"global\">Total market cap <strong>{}</strong> &middot; BTC dominance <strong>{:.1}%</strong></p>\n",
            format_compact_usd(global.total_market_cap),
            global.btc_dominance
        ));
    }

    section
}

/// Generate the on-chain stats list.
fn generate_onchain_section(onchain: &OnChainSummary) -> String {
    if onchain.is_empty() {
        return empty_state("On-chain data unavailable.");
    }

    let unavailable = || "<em>n/a</em>".to_string();
    let eth = onchain
        .eth_price
        .map(|p| format!("${}", format_number(p, 2)))
        .unwrap_or_else(unavailable);
    let gas = onchain
        .gas_prices
        .map(|g| {
            format!(
                "Safe {} &middot; Standard {} &middot; Fast {} gwei",
                g.safe, g.propose, g.fast
            )
        })
        .unwrap_or_else(unavailable);
    let block = onchain
        .latest_block
        .map(|b| format_number(b as f64, 0))
        .unwrap_or_else(unavailable);

    let mut section = String::new();
    section.push_str("<dl class=\"onchain\">\n");
    section.push_str(&format!("<dt>ETH Price</dt><dd>{}</dd>\n", eth));
    section.push_str(&format!("<dt>Gas</dt><dd>{}</dd>\n", gas));
    section.push_str(&format!("<dt>Latest Block</dt><dd>{}</dd>\n", block));
    section.push_str("</dl>\n");
    section
}

/// Generate the headline list.
fn generate_news_section(news: &[NewsItem]) -> String {
    if news.is_empty() {
        return empty_state("No headlines available.");
    }

    // Headlines
    let mut section = String::new();
    section.push_str("<ul class=\"news\">\n");

    for item in news {
        let published = item
            .published_at
            .map(|t| format!(" &middot; {}", t.format("%b %d, %H:%M UTC")))
            .unwrap_or_default();
        section.push_str(&format!(
            "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a><span class=\"source\">{}{}</span></li>\n",
            escape_html(&item.url),
            escape_html(&item.title),
            escape_html(&item.source),
            published
        ));
    }

    section.push_str("</ul>\n");
    section
}

/// Format with thousands separators, e.g. `62,400.12`.
fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format large dollar amounts as `$2.41T`, `$31.20B`, `$450.00M`.
fn format_compact_usd(value: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];

    for (scale, suffix) in UNITS {
        if value.abs() >= scale {
            return format!("${:.2}{}", value / scale, suffix);
        }
    }
    format!("${}", format_number(value, 0))
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
