pub mod handlers;
pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use routes::api::api_routes;
use state::AppState;

/// Builds the full router. `client_url`, when given, is the only origin allowed by CORS.
pub fn app(state: AppState, client_url: Option<&str>) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = client_url.and_then(|url| url.parse::<HeaderValue>().ok()) {
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
        app = app.layer(cors);
    }
    app
}
