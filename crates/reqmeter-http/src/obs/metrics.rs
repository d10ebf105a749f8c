//! Request metrics registered on the shared registry.
//!
//! Recording never fails the caller: label or value errors are logged and
//! dropped, since metrics sit beside the response path, not on it.

use std::sync::Arc;
use std::time::Duration;

use reqmeter_core::error::Result;
use reqmeter_core::{Counter, Histogram, Registry};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Labels derived for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    pub method: String,
    pub route: String,
}

pub struct HttpMetrics {
    requests_total: Arc<Counter>,
    request_duration: Arc<Histogram>,
}

impl HttpMetrics {
    /// Register both request metrics. Fails on duplicate names or bad buckets.
    pub fn register(registry: &Registry, duration_buckets: &[f64]) -> Result<Self> {
        let requests_total = registry.register_counter(
            HTTP_REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &["method", "route", "status_code"],
        )?;
        // status_code is left out to bound series count.
        let request_duration = registry.register_histogram(
            HTTP_REQUEST_DURATION_SECONDS,
            "Duration of HTTP requests in seconds",
            &["method", "route"],
            duration_buckets,
        )?;
        Ok(Self {
            requests_total,
            request_duration,
        })
    }

    pub fn requests_total(&self) -> &Counter {
        &self.requests_total
    }

    pub fn request_duration(&self) -> &Histogram {
        &self.request_duration
    }

    /// Count the request and observe its latency.
    pub fn record(&self, labels: &RequestLabels, status: u16, elapsed: Duration) {
        let status_code = status.to_string();
        let method = labels.method.as_str();
        let route = labels.route.as_str();

        if let Err(e) = self.requests_total.inc(&[
            ("method", method),
            ("route", route),
            ("status_code", status_code.as_str()),
        ]) {
            tracing::warn!(code = e.code().as_str(), error = %e, "request counter update failed");
        }

        if let Err(e) = self
            .request_duration
            .observe_duration(&[("method", method), ("route", route)], elapsed)
        {
            tracing::warn!(code = e.code().as_str(), error = %e, "request duration observe failed");
        }
    }
}
