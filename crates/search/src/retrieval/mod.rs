//! Retrieval over stored papers
//!
//! Provides two retrieval modes:
//! - Keyword search (case-insensitive substring match on summaries)
//! - Similarity search (Euclidean distance over embeddings of the last index snapshot)

mod keyword;
mod vector;

pub use keyword::{keyword_search, KeywordRetriever};
pub use vector::{euclidean_distance, SimilarityIndex, SimilarityRetriever, DEFAULT_TOP_K};

use paperscope_common::errors::{AppError, Result};
use paperscope_common::metrics;
use paperscope_common::PaperRecord;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

/// Retrieved paper with an optional distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPaper {
    #[serde(flatten)]
    pub record: PaperRecord,

    /// Euclidean distance to the query; absent for keyword matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,

    /// Retrieval mode used
    pub retrieval_mode: RetrievalMode,
}

/// Retrieval mode
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Substring match on summaries
    #[default]
    Keyword,
    /// Distance ranking against the index snapshot
    Similarity,
}

impl RetrievalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMode::Keyword => "keyword",
            RetrievalMode::Similarity => "similarity",
        }
    }
}

/// Search request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub query: String,

    /// Retrieval mode
    #[serde(default)]
    pub mode: RetrievalMode,

    /// Maximum results to return
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_TOP_K
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, mode: RetrievalMode) -> Self {
        Self {
            query: query.into(),
            mode,
            limit: DEFAULT_TOP_K,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Retrieved papers
    pub papers: Vec<RetrievedPaper>,

    /// Matching papers before the limit was applied
    pub total_count: usize,

    /// Query processing time in milliseconds
    pub query_time_ms: u64,

    /// Retrieval mode used
    pub mode: RetrievalMode,
}

/// Common trait for all retrievers
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// All matches in ranked order; callers apply the limit
    async fn retrieve(&self, request: &SearchRequest) -> Result<Vec<RetrievedPaper>>;

    /// Get the retrieval mode
    fn mode(&self) -> RetrievalMode;
}

/// Run `request` against `retriever`, apply the limit and record metrics
#[instrument(skip(retriever), fields(mode = retriever.mode().as_str()))]
pub async fn search(retriever: &dyn Retriever, request: &SearchRequest) -> Result<SearchResponse> {
    if request.query.trim().is_empty() {
        return Err(AppError::validation("query must not be empty"));
    }

    let started = Instant::now();
    let mut papers = retriever.retrieve(request).await?;
    let total_count = papers.len();
    papers.truncate(request.limit);

    let elapsed = started.elapsed();
    let mode = retriever.mode();
    metrics::record_search(elapsed.as_secs_f64(), mode.as_str(), papers.len());
    debug!(total_count, returned = papers.len(), "Search complete");

    Ok(SearchResponse {
        papers,
        total_count,
        query_time_ms: elapsed.as_millis() as u64,
        mode,
    })
}
