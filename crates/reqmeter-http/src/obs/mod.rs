//! Observability: request metrics and the response-completion hook that
//! feeds them.

pub mod completion;
pub mod metrics;

pub use completion::{CompletionBody, Outcome};
pub use metrics::{HttpMetrics, RequestLabels};
