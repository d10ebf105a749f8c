//! reqmeter HTTP library entry.
//!
//! Wires config, the shared metrics registry, the request metrics middleware
//! and the exposition endpoint into an axum router. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod router;
