use std::net::SocketAddr;

use serde::Deserialize;
use reqmeter_core::error::{ReqMeterError, Result};
use reqmeter_core::histogram::{validate_edges, DEFAULT_DURATION_BUCKETS};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ReqMeterError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ReqMeterError::Config(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Value of the `app` label attached to every series.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Exposition route.
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Upper bounds (seconds) of the request duration histogram.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    /// Export process gauges (memory, fds, uptime).
    #[serde(default = "default_true")]
    pub process_metrics: bool,

    /// Record responses whose body was dropped before completion.
    #[serde(default = "default_true")]
    pub record_aborted: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            path: default_metrics_path(),
            duration_buckets: default_duration_buckets(),
            process_metrics: true,
            record_aborted: true,
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(ReqMeterError::Config("metrics.app_name must not be empty".into()));
        }
        if !self.path.starts_with('/') || self.path == "/" {
            return Err(ReqMeterError::Config(
                "metrics.path must start with '/' and name a route other than '/'".into(),
            ));
        }
        // The router would read these as captures or wildcards and panic.
        if self.path.contains(&[':', '*'][..]) {
            return Err(ReqMeterError::Config(format!(
                "metrics.path {:?} must be a literal route without ':' or '*'",
                self.path
            )));
        }
        validate_edges(&self.duration_buckets)
            .map_err(|e| ReqMeterError::Config(format!("metrics.duration_buckets: {e}")))?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_app_name() -> String {
    "reqmeter".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_DURATION_BUCKETS.to_vec()
}
fn default_true() -> bool {
    true
}
