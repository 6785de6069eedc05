//! Paper management handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_body;
use crate::AppState;
use paperscope_common::{
    errors::{AppError, Result},
    export::ExportFormat,
    PaperRecord,
};
use paperscope_ingestion::IngestReport;
use paperscope_search::{HistoryQuery, HistoryStats};

/// Keywords or a paper URL
#[derive(Debug, Deserialize, Validate)]
pub struct FetchRequest {
    #[validate(length(min = 1, max = 2000))]
    pub input: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub paper: PaperRecord,
    /// False when the same document was uploaded before
    pub added: bool,
}

#[derive(Serialize)]
pub struct PapersResponse {
    pub papers: Vec<PaperRecord>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: Option<String>,
}

/// Fetch by keywords or URL, summarize and store
pub async fn fetch_papers(
    State(state): State<AppState>,
    Json(request): Json<FetchRequest>,
) -> Result<Json<IngestReport>> {
    validate_body(&request)?;

    let report = state.pipeline.fetch_and_summarize(&request.input).await?;

    tracing::info!(
        input = %request.input,
        added = report.added.len(),
        duplicates = report.duplicates.len(),
        failures = report.failures.len(),
        "Fetch completed"
    );

    Ok(Json(report))
}

/// Summarize an uploaded PDF sent as the raw request body
pub async fn upload_paper(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge {
                limit: state.config.server.max_upload_bytes,
            }
        } else {
            AppError::validation(rejection.body_text())
        }
    })?;

    if body.is_empty() {
        return Err(AppError::Validation {
            message: "Request body must contain a PDF document".to_string(),
            field: Some("body".to_string()),
        });
    }

    let filename = params
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "upload.pdf".to_string());

    let outcome = state.pipeline.process_upload(&filename, body.to_vec()).await?;
    let status = if outcome.added { StatusCode::CREATED } else { StatusCode::OK };

    Ok((
        status,
        Json(UploadResponse {
            paper: outcome.record,
            added: outcome.added,
        }),
    ))
}

/// History view with optional filter, sort order and limit
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<PapersResponse>> {
    let store = state.store.clone();
    let records = tokio::task::spawn_blocking(move || store.load()).await?;
    let papers = query.apply(records);

    Ok(Json(PapersResponse {
        count: papers.len(),
        papers,
    }))
}

pub async fn paper_stats(State(state): State<AppState>) -> Result<Json<HistoryStats>> {
    let store = state.store.clone();
    let records = tokio::task::spawn_blocking(move || store.load()).await?;
    Ok(Json(HistoryStats::compute(&records, Local::now())))
}

/// Get a paper by ID
pub async fn get_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<Json<PaperRecord>> {
    Ok(Json(find_paper(&state, paper_id).await?))
}

/// Download a paper as plain text or Markdown
pub async fn export_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<Response> {
    let format = match params.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>().map_err(|message| AppError::Validation {
            message,
            field: Some("format".to_string()),
        })?,
        None => ExportFormat::default(),
    };

    let paper = find_paper(&state, paper_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", format.filename(&paper));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        format.render(&paper),
    )
        .into_response())
}

/// Delete a paper
pub async fn delete_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<String>,
) -> Result<StatusCode> {
    let store = state.store.clone();
    let id = paper_id.clone();
    let removed = tokio::task::spawn_blocking(move || store.delete(&id)).await??;

    if !removed {
        return Err(AppError::PaperNotFound { id: paper_id });
    }

    tracing::info!(paper_id = %paper_id, "Paper deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Remove every stored paper
pub async fn clear_papers(State(state): State<AppState>) -> Result<StatusCode> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.clear()).await??;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_paper(state: &AppState, paper_id: String) -> Result<PaperRecord> {
    let store = state.store.clone();
    let id = paper_id.clone();
    tokio::task::spawn_blocking(move || store.get(&id))
        .await?
        .ok_or(AppError::PaperNotFound { id: paper_id })
}
