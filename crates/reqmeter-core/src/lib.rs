//! reqmeter core: metric families, registry, and Prometheus text exposition.
//!
//! This crate owns all metric state and its serialization. It carries no
//! transport or runtime dependencies so the HTTP layer (or a test) can build
//! isolated registries and share them by `Arc`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied outside tests
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Recording paths return `ReqMeterError` so the HTTP layer can log and move
//! on instead of failing a response.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod counter;
pub mod error;
pub mod exposition;
pub mod histogram;
pub mod labels;
pub mod process;
pub mod registry;

pub use counter::Counter;
pub use error::{ErrorCode, ReqMeterError, Result};
pub use exposition::CONTENT_TYPE;
pub use histogram::{Histogram, HistogramSnapshot, DEFAULT_DURATION_BUCKETS};
pub use process::{Collector, GaugeSample, ProcessCollector};
pub use registry::Registry;
