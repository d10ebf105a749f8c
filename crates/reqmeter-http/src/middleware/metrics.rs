//! Request metrics middleware.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::obs::{CompletionBody, Outcome, RequestLabels};

/// Route label: matched pattern, else raw path, else `"unknown"`.
pub fn route_label(request: &Request) -> String {
    if let Some(matched) = request.extensions().get::<MatchedPath>() {
        return matched.as_str().to_string();
    }
    let path = request.uri().path();
    if path.is_empty() {
        "unknown".to_string()
    } else {
        path.to_string()
    }
}

/// HEAD requests and 204/304 responses never put a body on the wire.
pub fn is_bodiless(method: &Method, status: StatusCode) -> bool {
    *method == Method::HEAD
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let labels = RequestLabels {
        method: method.to_string(),
        route: route_label(&request),
    };

    let response = next.run(request).await;

    let bodiless = is_bodiless(&method, response.status());
    let status = response.status().as_u16();
    let metrics = state.http_metrics();
    let record_aborted = state.cfg().metrics.record_aborted;

    let (parts, body) = response.into_parts();
    let on_complete = move |outcome: Outcome| {
        let elapsed = start.elapsed();
        if outcome != Outcome::Completed {
            tracing::debug!(
                method = %labels.method,
                route = %labels.route,
                status,
                outcome = outcome.as_str(),
                "response did not complete normally"
            );
            if outcome == Outcome::Aborted && !record_aborted {
                return;
            }
        }

        metrics.record(&labels, status, elapsed);
        tracing::debug!(
            method = %labels.method,
            route = %labels.route,
            status,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "request completed"
        );
    };
    let body = if bodiless {
        CompletionBody::bodiless(body, on_complete)
    } else {
        CompletionBody::new(body, on_complete)
    };

    Response::from_parts(parts, Body::new(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_path_when_no_route_matched() {
        let req = axum::http::Request::builder()
            .uri("/actual/path?x=1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&req), "/actual/path");
    }

    #[test]
    fn bodiless_responses() {
        assert!(is_bodiless(&Method::HEAD, StatusCode::OK));
        assert!(is_bodiless(&Method::GET, StatusCode::NO_CONTENT));
        assert!(is_bodiless(&Method::GET, StatusCode::NOT_MODIFIED));
        assert!(!is_bodiless(&Method::GET, StatusCode::OK));
        assert!(!is_bodiless(&Method::POST, StatusCode::NOT_FOUND));
    }
}
