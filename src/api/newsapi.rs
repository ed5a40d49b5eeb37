//! NewsAPI `/v2/everything` client.

use super::{non_empty, NewsSearch};
use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Search parameters for one headline query.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    /// OR-combined keyword expression.
    pub keywords: String,
    /// Oldest publication time to include.
    pub from: DateTime<Utc>,
    pub language: String,
    pub page_size: u32,
}

/// An article as NewsAPI returns it. Any field may be null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub source: ArticleSource,
    pub title: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: non_empty(api_key),
        }
    }

    fn search_request(&self, query: &NewsQuery, api_key: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/everything", self.base_url.trim_end_matches('/'));
        let from = query.from.format("%Y-%m-%dT%H:%M:%S").to_string();
        let page_size = query.page_size.to_string();

        let request = self.http.get(url).query(&[
            ("q", query.keywords.as_str()),
            ("from", from.as_str()),
            ("sortBy", "popularity"),
            ("language", query.language.as_str()),
            ("pageSize", page_size.as_str()),
            ("apiKey", api_key),
        ]);
        request
    }
}

#[async_trait]
impl NewsSearch for NewsApiClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &NewsQuery) -> SourceResult<Vec<Article>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("NEWS_API_KEY"))?;
        debug!("GET everything q={:?} from={}", query.keywords, query.from);

        let response = self.search_request(query, api_key).send().await?;

        // Error responses carry a JSON body with status "error", so read the
        // body before looking at the HTTP status.
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(parsed) => articles_from_response(parsed),
            Err(_) if !status.is_success() => Err(SourceError::Status { status, body }),
            Err(e) => Err(SourceError::Malformed(e.to_string())),
        }
    }
}

fn articles_from_response(response: SearchResponse) -> SourceResult<Vec<Article>> {
    if response.status != "ok" {
        return Err(SourceError::Api(
            response
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }
    Ok(response.articles)
}
