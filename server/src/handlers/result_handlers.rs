use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use pib_scraper::pipeline::{SummaryArtifact, SummaryOutcome};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Serialize)]
pub struct SummaryResponse {
    pub index: usize,
    pub title: String,
    pub summary: String,
    pub file_name: String,
    pub pdf_base64: String,
}

/// GET /api/results
pub async fn list_results(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let current = state.results.current();
    (StatusCode::OK, Json(json!(*current)))
}

async fn generate(state: &AppState, index: usize) -> Result<SummaryArtifact, ApiError> {
    let item = state.results.item(index).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("No result at index {index}") })),
        )
    })?;

    match state.pipeline.summarize_item(index, &item).await {
        SummaryOutcome::Ready(artifact) => Ok(artifact),
        SummaryOutcome::CouldNotFetch => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Could not fetch article text." })),
        )),
        SummaryOutcome::RenderFailed(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("PDF generation failed: {e}") })),
        )),
    }
}

/// POST /api/results/{index}/summary
pub async fn summarize_result(
    Extension(state): Extension<AppState>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, ApiError> {
    let artifact = generate(&state, index).await?;
    let body = SummaryResponse {
        index: artifact.index,
        title: artifact.title,
        summary: artifact.summary,
        file_name: artifact.file_name,
        pdf_base64: STANDARD.encode(&artifact.pdf),
    };
    Ok((StatusCode::OK, Json(body)))
}

/// GET /api/results/{index}/pdf
pub async fn download_pdf(
    Extension(state): Extension<AppState>,
    Path(index): Path<usize>,
) -> Result<Response, ApiError> {
    let artifact = generate(&state, index).await?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.pdf,
    )
        .into_response())
}
