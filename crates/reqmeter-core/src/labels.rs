//! Label schemas and identifier validation.
//!
//! A metric declares its label keys once at registration. Every recording call
//! passes `(key, value)` pairs in any order; [`LabelSchema::resolve`] reorders
//! them into declared-key order so the pair list can be used directly as a
//! map key.

use crate::error::{ReqMeterError, Result};

/// Returns true for `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Returns true for `[a-zA-Z_][a-zA-Z0-9_]*` not starting with `__`.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn check_metric_name(name: &str) -> Result<()> {
    if is_valid_metric_name(name) {
        Ok(())
    } else {
        Err(ReqMeterError::InvalidMetricName(name.to_string()))
    }
}

/// Declared label keys of one metric.
#[derive(Debug, Clone)]
pub struct LabelSchema {
    keys: Vec<String>,
}

impl LabelSchema {
    /// Validate and capture label keys. `reserved` keys are rejected
    /// (histograms reserve `le`).
    pub fn new(keys: &[&str], reserved: &[&str]) -> Result<Self> {
        let mut out: Vec<String> = Vec::with_capacity(keys.len());
        for k in keys {
            if !is_valid_label_name(k) || reserved.contains(k) {
                return Err(ReqMeterError::InvalidLabelName((*k).to_string()));
            }
            if out.iter().any(|o| o == k) {
                return Err(ReqMeterError::InvalidLabelName(format!("duplicate label key: {k}")));
            }
            out.push((*k).to_string());
        }
        Ok(Self { keys: out })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Match supplied pairs against the declared keys.
    ///
    /// Returns the values in declared-key order. Every declared key must be
    /// supplied exactly once and no undeclared key may appear.
    pub fn resolve(&self, metric: &str, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        if labels.len() != self.keys.len() {
            return Err(ReqMeterError::LabelMismatch {
                metric: metric.to_string(),
                detail: format!(
                    "expected {} labels [{}], got {}",
                    self.keys.len(),
                    self.keys.join(","),
                    labels.len()
                ),
            });
        }

        let mut values = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let mut found = labels.iter().filter(|(k, _)| *k == key.as_str());
            let Some((_, v)) = found.next() else {
                return Err(ReqMeterError::LabelMismatch {
                    metric: metric.to_string(),
                    detail: format!("missing label: {key}"),
                });
            };
            if found.next().is_some() {
                return Err(ReqMeterError::LabelMismatch {
                    metric: metric.to_string(),
                    detail: format!("label supplied twice: {key}"),
                });
            }
            values.push((*v).to_string());
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn metric_names() {
        assert!(is_valid_metric_name("http_requests_total"));
        assert!(is_valid_metric_name("ns:sub_metric"));
        assert!(!is_valid_metric_name(""));
        assert!(!is_valid_metric_name("1abc"));
        assert!(!is_valid_metric_name("with-dash"));
    }

    #[test]
    fn label_names() {
        assert!(is_valid_label_name("status_code"));
        assert!(!is_valid_label_name("__reserved"));
        assert!(!is_valid_label_name("a:b"));
    }

    #[test]
    fn resolve_is_order_independent() {
        let schema = LabelSchema::new(&["method", "route"], &[]).unwrap();
        let a = schema.resolve("m", &[("method", "GET"), ("route", "/foo")]).unwrap();
        let b = schema.resolve("m", &[("route", "/foo"), ("method", "GET")]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, vec!["GET".to_string(), "/foo".to_string()]);
    }

    #[test]
    fn resolve_rejects_missing_extra_and_repeated() {
        let schema = LabelSchema::new(&["method", "route"], &[]).unwrap();

        let err = schema.resolve("m", &[("method", "GET")]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::LabelMismatch);

        let err = schema
            .resolve("m", &[("method", "GET"), ("path", "/foo")])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::LabelMismatch);

        let err = schema
            .resolve("m", &[("method", "GET"), ("method", "POST")])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::LabelMismatch);
    }

    #[test]
    fn reserved_and_duplicate_keys_rejected() {
        let err = LabelSchema::new(&["le"], &["le"]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLabelName);
        let err = LabelSchema::new(&["a", "a"], &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLabelName);
    }
}
