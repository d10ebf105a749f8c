//! Operational HTTP endpoints.
//!
//! - `/metrics` : Prometheus text format (path is configurable)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use reqmeter_core::CONTENT_TYPE;

use crate::app_state::AppState;

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.registry().serialize();

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
