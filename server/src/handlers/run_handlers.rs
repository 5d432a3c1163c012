use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use pib_scraper::pipeline::RunRequest;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::state::{AppState, RunStatus};

#[derive(Serialize)]
pub struct RunCreated {
    pub run_id: Uuid,
}

/// POST /api/runs
pub async fn start_run(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RunRequest>,
) -> impl IntoResponse {
    if let Err(message) = payload.selection.validate() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": message })));
    }

    // 1) New run_id, recorded as Pending
    let (run_id, sequence) = state.runs.start();
    info!(%run_id, sequence, topic = %payload.topic, "run started");

    // 2) Run in the background; the client polls for progress
    let task_state = state.clone();
    tokio::spawn(async move {
        let runs = task_state.runs.clone();
        let outcome = task_state
            .pipeline
            .run(&payload, move |phase| runs.update(run_id, RunStatus::from(phase)))
            .await;

        // 3) Publish the result set before marking the run terminal
        match task_state.complete_run(run_id, sequence, outcome) {
            RunStatus::Complete { items, .. } => info!(%run_id, items, "run complete"),
            _ => info!(%run_id, "run finished without data"),
        }
    });

    (StatusCode::ACCEPTED, Json(json!(RunCreated { run_id })))
}

/// GET /api/runs/{id}
pub async fn poll_run(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.runs.get(&id) {
        Some(status) => (StatusCode::OK, Json(json!(status))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "Run not found" }))),
    }
}
