//! arXiv Atom API client
//!
//! Keyword search and single-paper metadata lookup. Responses are Atom feeds
//! parsed with quick-xml's serde support.

use crate::errors::IngestionError;
use crate::url::extract_identifier;
use async_trait::async_trait;
use paperscope_common::config::ArxivConfig;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    /// Abstract page URL, e.g. http://arxiv.org/abs/2301.12345v1
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
}

impl Entry {
    /// The API reports bad queries as a single entry titled "Error"
    fn is_error(&self) -> bool {
        self.title.trim() == "Error" || self.id.contains("/api/errors")
    }
}

/// Paper metadata from the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArxivPaper {
    /// Canonical identifier without version suffix
    pub id: String,
    pub title: String,
    pub abstract_text: String,
}

/// Keyword search and identifier lookup against a paper repository
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Newest papers matching every keyword
    async fn search(&self, keywords: &str, max_results: usize) -> Result<Vec<ArxivPaper>, IngestionError>;

    /// Metadata for one identifier
    async fn lookup(&self, id: &str) -> Result<ArxivPaper, IngestionError>;
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an Atom feed into papers. An error entry fails the whole feed.
pub fn parse_feed(xml: &str) -> Result<Vec<ArxivPaper>, IngestionError> {
    let feed: Feed = from_str(xml)
        .map_err(|e| IngestionError::SearchError(format!("Failed to parse XML: {}", e)))?;

    if let Some(error) = feed.entries.iter().find(|e| e.is_error()) {
        return Err(IngestionError::SearchError(format!(
            "arXiv API error: {}",
            collapse_whitespace(&error.summary)
        )));
    }

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| ArxivPaper {
            id: extract_identifier(&entry.id).unwrap_or_else(|| entry.id.trim().to_string()),
            title: collapse_whitespace(&entry.title),
            abstract_text: collapse_whitespace(&entry.summary),
        })
        .collect())
}

/// Search query joining every whitespace-separated keyword with AND
pub fn keyword_query(keywords: &str) -> String {
    keywords.split_whitespace().collect::<Vec<_>>().join(" AND ")
}

/// Client for the arXiv export API
pub struct ArxivClient {
    client: reqwest::Client,
    api_base: String,
}

impl ArxivClient {
    pub fn new(config: &ArxivConfig) -> Result<Self, IngestionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IngestionError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<String, IngestionError> {
        let response = self
            .client
            .get(&self.api_base)
            .query(params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IngestionError::SearchError(e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| IngestionError::SearchError(e.to_string()))
    }
}

#[async_trait]
impl MetadataSource for ArxivClient {
    #[instrument(skip(self))]
    async fn search(&self, keywords: &str, max_results: usize) -> Result<Vec<ArxivPaper>, IngestionError> {
        let params = [
            ("search_query", keyword_query(keywords)),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "submittedDate".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let body = self.query(&params).await?;
        let papers = parse_feed(&body)?;
        debug!(count = papers.len(), "arXiv search complete");
        Ok(papers)
    }

    #[instrument(skip(self))]
    async fn lookup(&self, id: &str) -> Result<ArxivPaper, IngestionError> {
        let params = [("id_list", id.to_string()), ("max_results", "1".to_string())];

        let metadata_error = |message: String| IngestionError::MetadataError {
            id: id.to_string(),
            message,
        };

        let body = self.query(&params).await.map_err(|e| metadata_error(e.to_string()))?;
        parse_feed(&body)
            .map_err(|e| metadata_error(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| metadata_error("no entry returned".to_string()))
    }
}
