//! Search handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_body;
use crate::AppState;
use paperscope_common::errors::Result;
use paperscope_search::{retrieval::DEFAULT_TOP_K, RetrievalMode, SearchRequest, SearchResponse};

/// Search request
#[derive(Debug, Deserialize, Validate)]
pub struct SearchBody {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,

    /// `keyword` (default) or `similarity`
    #[serde(default)]
    pub mode: RetrievalMode,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize { DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct RebuildResponse {
    pub indexed: usize,
}

/// Perform a search
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>> {
    validate_body(&body)?;

    let request = SearchRequest::new(body.query, body.mode).with_limit(body.limit);
    let retriever = state.retriever(body.mode);
    let response = paperscope_search::search(retriever.as_ref(), &request).await?;

    tracing::info!(
        query = %request.query,
        mode = body.mode.as_str(),
        results = response.papers.len(),
        latency_ms = response.query_time_ms,
        "Search completed"
    );

    Ok(Json(response))
}

/// Rebuild the similarity snapshot from the current store
pub async fn rebuild_index(State(state): State<AppState>) -> Result<Json<RebuildResponse>> {
    let store = state.store.clone();
    let index = state.index.clone();
    let indexed = tokio::task::spawn_blocking(move || index.build(&store.load())).await??;

    Ok(Json(RebuildResponse { indexed }))
}
