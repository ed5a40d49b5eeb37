//! Data models for the market brief.
//!
//! This module contains the typed snapshots produced by each collector,
//! the bundle handed to the analyzer, and the final report.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a price move versus the prior period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    /// Exactly unchanged after rounding.
    Flat,
}

impl Direction {
    /// Classify a percent change.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else if change < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    /// Returns an arrow glyph for the direction.
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Flat => "■",
        }
    }

    /// CSS class used by the HTML template.
    pub fn css_class(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Flat => "flat",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Flat => write!(f, "flat"),
        }
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A single traditional-market instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPoint {
    /// Display name (e.g. "S&P 500").
    pub name: String,
    /// Ticker symbol (e.g. "^GSPC").
    pub symbol: String,
    /// Latest close, rounded to 2 decimals.
    pub price: f64,
    /// Percent change versus the previous close, rounded to 2 decimals.
    pub change_percent: f64,
    pub direction: Direction,
}

impl MarketPoint {
    /// Build a point from the two most recent closes.
    ///
    /// Returns `None` when the previous close is zero.
    pub fn from_closes(name: &str, symbol: &str, previous: f64, latest: f64) -> Option<Self> {
        if previous == 0.0 {
            return None;
        }

        let change_percent = round2((latest - previous) / previous * 100.0);

        Some(Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price: round2(latest),
            change_percent,
            direction: Direction::from_change(change_percent),
        })
    }
}

/// Traditional markets, in configured ticker order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradFiSnapshot {
    pub points: Vec<MarketPoint>,
}

impl TradFiSnapshot {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Look up an instrument by display name.
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&MarketPoint> {
        self.points.iter().find(|p| p.name == name)
    }
}

/// Per-coin market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSnapshot {
    /// Upstream coin identifier (e.g. "bitcoin").
    pub id: String,
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub direction: Direction,
}

/// Whole-market crypto statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketStat {
    pub total_market_cap: f64,
    /// Bitcoin share of total market cap, in percent.
    pub btc_dominance: f64,
}

/// Crypto markets: per-coin data plus optional global stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CryptoSnapshot {
    pub coins: Vec<CoinSnapshot>,
    pub global: Option<GlobalMarketStat>,
}

impl CryptoSnapshot {
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty() && self.global.is_none()
    }

    /// Look up a coin by identifier.
    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&CoinSnapshot> {
        self.coins.iter().find(|c| c.id == id)
    }
}

/// Gas price estimates in gwei.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasPriceTiers {
    pub safe: f64,
    pub propose: f64,
    pub fast: f64,
}

/// On-chain activity. Always present; each slot may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnChainSummary {
    pub eth_price: Option<f64>,
    pub gas_prices: Option<GasPriceTiers>,
    pub latest_block: Option<u64>,
    #[serde(with = "local_timestamp")]
    pub collected_at: DateTime<Local>,
}

impl OnChainSummary {
    /// A summary with every slot absent.
    pub fn empty(collected_at: DateTime<Local>) -> Self {
        Self {
            eth_price: None,
            gas_prices: None,
            latest_block: None,
            collected_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.eth_price.is_none() && self.gas_prices.is_none() && self.latest_block.is_none()
    }
}

/// A news headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Everything the collectors produced for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub tradfi: TradFiSnapshot,
    pub crypto: CryptoSnapshot,
    pub onchain: OnChainSummary,
    pub news: Vec<NewsItem>,
}

/// The daily report. Built once per run and written once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    #[serde(with = "local_timestamp")]
    pub generated_at: DateTime<Local>,
    #[serde(flatten)]
    pub data: MarketData,
    /// Analysis text as returned by the model (lightly marked-up prose).
    pub analysis: String,
}

impl Report {
    pub fn new(data: MarketData, analysis: String, generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            data,
            analysis,
        }
    }

    /// Long-form date, e.g. "March 07, 2024".
    pub fn date_label(&self) -> String {
        self.generated_at.format("%B %d, %Y").to_string()
    }

    /// 12-hour clock time, e.g. "09:30 AM".
    pub fn time_label(&self) -> String {
        self.generated_at.format("%I:%M %p").to_string()
    }

    /// File stem derived from the capture date, e.g. "report_20240307".
    pub fn file_stem(&self) -> String {
        self.generated_at.format("report_%Y%m%d").to_string()
    }
}

/// Serde adapter writing local timestamps as `YYYY-MM-DD HH:MM:SS`.
pub mod local_timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&text, FORMAT).map_err(de::Error::custom)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| de::Error::custom(format!("invalid local time: {}", text)))
    }
}
