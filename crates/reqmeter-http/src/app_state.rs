//! Shared application state for the reqmeter service.
//!
//! Built once at startup. Registration failures (duplicate names, bad
//! buckets) surface as `Err` so `main` can refuse to start.

use std::sync::Arc;

use reqmeter_core::error::Result;
use reqmeter_core::{ProcessCollector, Registry};

use crate::config::ServiceConfig;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<Registry>,
    http: Arc<HttpMetrics>,
}

struct AppStateInner {
    cfg: ServiceConfig,
}

impl AppState {
    /// Build a registry labelled `app=<metrics.app_name>` and register the
    /// request metrics (and process gauges, when enabled) on it.
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let registry = Registry::with_default_labels([("app", cfg.metrics.app_name.clone())])?;
        if cfg.metrics.process_metrics {
            registry.register_collector(Arc::new(ProcessCollector::new()))?;
        }
        Self::with_registry(cfg, Arc::new(registry))
    }

    /// Register the request metrics on a caller-supplied registry.
    pub fn with_registry(cfg: ServiceConfig, registry: Arc<Registry>) -> Result<Self> {
        let http = HttpMetrics::register(&registry, &cfg.metrics.duration_buckets)?;

        tracing::info!(
            app = %cfg.metrics.app_name,
            metrics = registry.metric_names().len(),
            "metrics registry ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            registry,
            http: Arc::new(http),
        })
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn http_metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.http)
    }
}
