//! notesum-server
//!
//! HTTP transport for the summarization pipeline.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/templates", get(routes::templates::list_templates))
        .route(
            "/ingest",
            get(routes::ingest::ingest_database).post(routes::ingest::ingest_database),
        )
        .route("/answer", post(routes::answer::answer))
        .route("/report", post(routes::answer::report))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
