//! Thin `reqwest`-based `ExternalClient` wrappers over third-party discovery
//! APIs. Each adapts its API's response shape into `RawItem` and surfaces
//! failure as a single categorical `CoreError`; none of them consult a
//! breaker themselves, per spec.
//!
//! Grounded on `src/services/external/{google_search,news_api,
//! semantic_scholar}.py`.

use async_trait::async_trait;
use chrono::Utc;
use research_contracts::{CoreError, ExternalClient, RawItem, SourceType};
use serde::Deserialize;
use std::time::Duration;

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder().timeout(timeout).build().unwrap_or_default()
}

/// Google Custom Search-style web client.
pub struct WebSearchClient {
    api_key: String,
    search_engine_id: String,
    base_url: String,
}

impl WebSearchClient {
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    #[serde(default)]
    items: Vec<GoogleSearchItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleSearchItem {
    link: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
}

#[async_trait]
impl ExternalClient for WebSearchClient {
    fn name(&self) -> &str {
        "web-search"
    }

    async fn search(&self, query: &str, limit: usize, deadline: Duration) -> Result<Vec<RawItem>, CoreError> {
        let client = http_client(deadline);
        let response = client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.search_engine_id.as_str()),
                ("q", query),
                ("num", &limit.min(10).to_string()),
            ])
            .send()
            .await
            .map_err(|e| CoreError::unavailable("web-search", research_contracts::UnavailableReason::DependencyFailure, e.to_string()))?;

        let body: GoogleSearchResponse = response
            .json()
            .await
            .map_err(|e| CoreError::internal(format!("web-search response decode failed: {e}")))?;

        Ok(body
            .items
            .into_iter()
            .take(limit)
            .filter_map(|item| {
                let url = item.link?;
                Some(RawItem {
                    source_type: SourceType::Web,
                    canonical_identifier: url.clone(),
                    url: Some(url),
                    title: item.title.unwrap_or_default(),
                    description: item.snippet,
                    content: None,
                    published_at: None,
                    metadata: research_contracts::Bag::new(),
                })
            })
            .collect())
    }
}

/// NewsAPI-style client.
pub struct NewsClient {
    api_key: String,
    base_url: String,
}

impl NewsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: "https://newsapi.org/v2/everything".to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<chrono::DateTime<Utc>>,
}

#[async_trait]
impl ExternalClient for NewsClient {
    fn name(&self) -> &str {
        "news"
    }

    async fn search(&self, query: &str, limit: usize, deadline: Duration) -> Result<Vec<RawItem>, CoreError> {
        let client = http_client(deadline);
        let response = client
            .get(&self.base_url)
            .query(&[("apiKey", self.api_key.as_str()), ("q", query), ("pageSize", &limit.to_string())])
            .send()
            .await
            .map_err(|e| CoreError::unavailable("news", research_contracts::UnavailableReason::DependencyFailure, e.to_string()))?;

        let body: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| CoreError::internal(format!("news response decode failed: {e}")))?;

        Ok(body
            .articles
            .into_iter()
            .take(limit)
            .filter_map(|article| {
                let url = article.url?;
                Some(RawItem {
                    source_type: SourceType::News,
                    canonical_identifier: url.clone(),
                    url: Some(url),
                    title: article.title.unwrap_or_default(),
                    description: article.description,
                    content: None,
                    published_at: article.published_at,
                    metadata: research_contracts::Bag::new(),
                })
            })
            .collect())
    }
}

/// Semantic Scholar-style academic client.
pub struct AcademicClient {
    base_url: String,
}

impl AcademicClient {
    pub fn new() -> Self {
        Self { base_url: "https://api.semanticscholar.org/graph/v1/paper/search".to_string() }
    }
}

impl Default for AcademicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct SemanticScholarResponse {
    #[serde(default)]
    data: Vec<SemanticScholarPaper>,
}

#[derive(Debug, Deserialize)]
struct SemanticScholarPaper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    url: Option<String>,
    year: Option<i32>,
}

#[async_trait]
impl ExternalClient for AcademicClient {
    fn name(&self) -> &str {
        "academic"
    }

    async fn search(&self, query: &str, limit: usize, deadline: Duration) -> Result<Vec<RawItem>, CoreError> {
        let client = http_client(deadline);
        let response = client
            .get(&self.base_url)
            .query(&[("query", query), ("limit", &limit.to_string()), ("fields", "title,abstract,url,year")])
            .send()
            .await
            .map_err(|e| CoreError::unavailable("academic", research_contracts::UnavailableReason::DependencyFailure, e.to_string()))?;

        let body: SemanticScholarResponse = response
            .json()
            .await
            .map_err(|e| CoreError::internal(format!("academic response decode failed: {e}")))?;

        Ok(body
            .data
            .into_iter()
            .take(limit)
            .filter_map(|paper| {
                let paper_id = paper.paper_id?;
                let mut metadata = research_contracts::Bag::new();
                if let Some(year) = paper.year {
                    metadata.insert("year".to_string(), serde_json::json!(year));
                }
                Some(RawItem {
                    source_type: SourceType::Academic,
                    canonical_identifier: paper_id,
                    url: paper.url,
                    title: paper.title.unwrap_or_default(),
                    description: paper.abstract_text,
                    content: None,
                    published_at: None,
                    metadata,
                })
            })
            .collect())
    }
}
