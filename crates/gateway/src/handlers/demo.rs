//! Demo dataset handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use paperscope_common::errors::{AppError, Result};
use paperscope_ingestion::demo::load_demo_data;

#[derive(Debug, Deserialize)]
pub struct DemoLoadRequest {
    /// Accepted for older clients. The snapshot is always rewritten so it
    /// never lists records the store no longer holds.
    #[serde(default = "default_build_index")]
    pub build_index: bool,
}

fn default_build_index() -> bool { true }

#[derive(Serialize)]
pub struct DemoLoadResponse {
    pub count: usize,
    pub indexed: usize,
}

/// Replace the store and the similarity snapshot with the demo dataset.
/// Only available in demo mode.
pub async fn load_demo(
    State(state): State<AppState>,
    Json(_request): Json<DemoLoadRequest>,
) -> Result<Json<DemoLoadResponse>> {
    if !state.config.is_demo() {
        return Err(AppError::DemoModeRestricted {
            operation: "demo_load".to_string(),
        });
    }

    let store = state.store.clone();
    let index = state.index.clone();

    let response = tokio::task::spawn_blocking(move || -> Result<DemoLoadResponse> {
        let records = load_demo_data(&store)?;
        let indexed = index.build(&records)?;
        Ok(DemoLoadResponse {
            count: records.len(),
            indexed,
        })
    })
    .await??;

    Ok(Json(response))
}
