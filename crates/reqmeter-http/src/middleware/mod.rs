//! Request middleware.

pub mod metrics;

pub use metrics::{route_label, track_requests};
