// crates/server/src/lib.rs
//! HTTP surface for docsmith: job submission, polling, artifact download.

pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
///
/// The API lives under `/api`; `/health` is also exposed at the root for
/// load-balancer probes that do not know the prefix.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/generate", post(routes::generate::generate))
        .route("/status/{job_id}", get(routes::status::status))
        .route("/download/{job_id}", get(routes::download::download))
        .route("/jobs", get(routes::jobs::list))
        .route("/jobs/stream", get(routes::jobs::stream))
        .route("/jobs/{job_id}/cancel", post(routes::jobs::cancel))
        .route("/languages", get(routes::meta::languages))
        .route("/health", get(routes::health::health));

    Router::new()
        .route("/", get(routes::meta::index))
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
