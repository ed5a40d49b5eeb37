//! Financial headlines from the last day.

use crate::api::{Article, NewsQuery, NewsSearch};
use crate::config::NewsConfig;
use crate::models::NewsItem;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Placeholder title NewsAPI uses for withdrawn articles.
const REMOVED_TITLE: &str = "[Removed]";

pub struct NewsCollector {
    api: Arc<dyn NewsSearch>,
    config: NewsConfig,
}

impl NewsCollector {
    pub fn new(api: Arc<dyn NewsSearch>, config: NewsConfig) -> Self {
        Self { api, config }
    }

    pub async fn collect(&self) -> Vec<NewsItem> {
        if !self.api.has_credentials() {
            error!("❌ No NEWS_API_KEY set, skipping news");
            return Vec::new();
        }

        let query = self.query(Utc::now());
        match self.api.search(&query).await {
            Ok(articles) => {
                let items: Vec<NewsItem> = articles.into_iter().filter_map(to_news_item).collect();
                for item in &items {
                    info!("✅ {}: {}", item.source, preview(&item.title, 60));
                }
                items
            }
            Err(e) => {
                error!("❌ Error fetching news: {}", e);
                Vec::new()
            }
        }
    }

    fn query(&self, now: DateTime<Utc>) -> NewsQuery {
        NewsQuery {
            keywords: self.config.keywords.clone(),
            from: now - Duration::hours(self.config.lookback_hours as i64),
            language: self.config.language.clone(),
            page_size: self.config.page_size,
        }
    }
}

fn to_news_item(article: Article) -> Option<NewsItem> {
    let title = article.title.filter(|t| !t.trim().is_empty() && t != REMOVED_TITLE)?;
    let url = article.url.filter(|u| !u.trim().is_empty())?;

    let published_at = article.published_at.as_deref().and_then(|text| {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| warn!("Unparseable publishedAt {:?}: {}", text, e))
            .ok()
    });

    Some(NewsItem {
        title,
        source: article.source.name.unwrap_or_else(|| "Unknown".to_string()),
        url,
        published_at,
    })
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
