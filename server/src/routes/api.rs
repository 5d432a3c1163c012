use axum::routing::{get, post};
use axum::Router;

use crate::handlers::result_handlers::{download_pdf, list_results, summarize_result};
use crate::handlers::run_handlers::{poll_run, start_run};

pub fn api_routes() -> Router {
    Router::new()
        .route("/runs", post(start_run))
        .route("/runs/{id}", get(poll_run))
        .route("/results", get(list_results))
        .route("/results/{index}/summary", post(summarize_result))
        .route("/results/{index}/pdf", get(download_pdf))
}
