//! Shared error type across reqmeter crates.

use thiserror::Error;

/// Stable error codes (used in logs and asserted by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A metric (or collector sample) with this name is already registered.
    DuplicateMetricName,
    /// Histogram bucket edges are empty, unordered, or not finite.
    InvalidBucketEdges,
    /// Supplied labels do not match the declared label keys.
    LabelMismatch,
    /// Metric name is not a valid exposition identifier.
    InvalidMetricName,
    /// Label name is not a valid exposition identifier (or is reserved).
    InvalidLabelName,
    /// Observed value cannot be recorded.
    InvalidObservation,
    /// Configuration failed to load or validate.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DuplicateMetricName => "DUPLICATE_METRIC_NAME",
            ErrorCode::InvalidBucketEdges => "INVALID_BUCKET_EDGES",
            ErrorCode::LabelMismatch => "LABEL_MISMATCH",
            ErrorCode::InvalidMetricName => "INVALID_METRIC_NAME",
            ErrorCode::InvalidLabelName => "INVALID_LABEL_NAME",
            ErrorCode::InvalidObservation => "INVALID_OBSERVATION",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ReqMeterError>;

/// Unified error type used by core and http.
#[derive(Debug, Error)]
pub enum ReqMeterError {
    #[error("duplicate metric name: {0}")]
    DuplicateMetricName(String),
    #[error("invalid bucket edges: {0}")]
    InvalidBucketEdges(String),
    #[error("label mismatch for {metric}: {detail}")]
    LabelMismatch { metric: String, detail: String },
    #[error("invalid metric name: {0}")]
    InvalidMetricName(String),
    #[error("invalid label name: {0}")]
    InvalidLabelName(String),
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ReqMeterError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReqMeterError::DuplicateMetricName(_) => ErrorCode::DuplicateMetricName,
            ReqMeterError::InvalidBucketEdges(_) => ErrorCode::InvalidBucketEdges,
            ReqMeterError::LabelMismatch { .. } => ErrorCode::LabelMismatch,
            ReqMeterError::InvalidMetricName(_) => ErrorCode::InvalidMetricName,
            ReqMeterError::InvalidLabelName(_) => ErrorCode::InvalidLabelName,
            ReqMeterError::InvalidObservation(_) => ErrorCode::InvalidObservation,
            ReqMeterError::Config(_) => ErrorCode::Config,
            ReqMeterError::Internal(_) => ErrorCode::Internal,
        }
    }
}
