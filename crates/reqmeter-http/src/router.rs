//! Axum router wiring.
//!
//! `/` serves the application, the configured metrics path serves the
//! exposition text. Every route, the 404 fallback included, runs through the
//! request metrics middleware.

use axum::{http::StatusCode, middleware, routing::get, Router};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().metrics.path.clone();

    Router::new()
        .route("/", get(root))
        .route(&metrics_path, get(ops::metrics))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::track_requests,
        ))
        .with_state(state)
}

async fn root() -> &'static str {
    "Hello World!"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
