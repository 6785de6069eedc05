//! Health check and metrics handlers

use axum::{extract::State, Json};
use paperscope_common::store::StoreStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    /// Summarization mode, `demo` or `live`
    pub mode: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub papers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: paperscope_common::VERSION.to_string(),
    })
}

/// Readiness probe - the paper store must be readable
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let store = state.store.clone();
    let snapshot = tokio::task::spawn_blocking(move || store.load_snapshot()).await;

    let store_check = match snapshot {
        Ok(snapshot) => match snapshot.status {
            StoreStatus::Loaded | StoreStatus::Missing => CheckResult {
                status: "up".to_string(),
                papers: Some(snapshot.records.len()),
                error: None,
            },
            StoreStatus::Corrupt { reason } => CheckResult {
                status: "down".to_string(),
                papers: None,
                error: Some(reason),
            },
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            papers: None,
            error: Some(e.to_string()),
        },
    };

    let all_healthy = store_check.status == "up";

    Json(ReadyResponse {
        status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
        mode: state.config.summarizer.mode.as_str().to_string(),
        checks: HealthChecks { store: store_check },
    })
}

/// Prometheus exposition
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
