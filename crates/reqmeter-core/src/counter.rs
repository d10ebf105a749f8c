use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::exposition::{write_header, write_sample};
use crate::labels::LabelSchema;

/// Monotonic counter family keyed by label values in declared-key order.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    schema: LabelSchema,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl Counter {
    pub(crate) fn new(name: &str, help: &str, schema: LabelSchema) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            schema,
            map: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_keys(&self) -> &[String] {
        self.schema.keys()
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.add(labels, 1)
    }

    /// Increment by an arbitrary amount. Unseen label-tuples start at zero.
    /// Counts saturate at `u64::MAX` instead of wrapping.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) -> Result<()> {
        let key = self.schema.resolve(&self.name, labels)?;
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
            Some(c.saturating_add(v))
        });
        Ok(())
    }

    /// Current count for a label-tuple, `None` if never incremented.
    pub fn value(&self, labels: &[(&str, &str)]) -> Result<Option<u64>> {
        let key = self.schema.resolve(&self.name, labels)?;
        Ok(self.map.get(&key).map(|c| c.load(Ordering::Relaxed)))
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, defaults: &[(String, String)], out: &mut String) {
        write_header(out, &self.name, &self.help, "counter");

        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        if rows.is_empty() && self.schema.keys().is_empty() {
            write_sample(out, &self.name, &[], defaults, None, "0");
            return;
        }

        for (values, count) in &rows {
            let series = pair(self.schema.keys(), values);
            write_sample(out, &self.name, &series, defaults, None, &count.to_string());
        }
    }
}

pub(crate) fn pair<'a>(keys: &'a [String], values: &'a [String]) -> Vec<(&'a str, &'a str)> {
    keys.iter()
        .zip(values.iter())
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn requests() -> Counter {
        let schema = LabelSchema::new(&["method", "route", "status_code"], &[]).unwrap();
        Counter::new("http_requests_total", "Total number of HTTP requests", schema)
    }

    #[test]
    fn counts_accumulate_per_tuple() {
        let c = requests();
        let labels = [("method", "GET"), ("route", "/foo"), ("status_code", "200")];
        c.inc(&labels).unwrap();
        c.add(&labels, 4).unwrap();
        c.inc(&[("method", "POST"), ("route", "/foo"), ("status_code", "201")])
            .unwrap();

        assert_eq!(c.value(&labels).unwrap(), Some(5));
        assert_eq!(
            c.value(&[("method", "PUT"), ("route", "/foo"), ("status_code", "200")])
                .unwrap(),
            None
        );
    }

    #[test]
    fn count_saturates_instead_of_wrapping() {
        let c = requests();
        let labels = [("method", "GET"), ("route", "/"), ("status_code", "200")];
        c.add(&labels, u64::MAX - 1).unwrap();
        c.inc(&labels).unwrap();
        c.inc(&labels).unwrap();
        c.add(&labels, 10).unwrap();
        assert_eq!(c.value(&labels).unwrap(), Some(u64::MAX));
    }

    #[test]
    fn label_order_follows_declaration() {
        let c = requests();
        assert_eq!(c.label_keys(), ["method", "route", "status_code"]);

        c.inc(&[("status_code", "200"), ("route", "/"), ("method", "GET")])
            .unwrap();
        let mut out = String::new();
        c.render(&[], &mut out);
        assert!(out.contains("http_requests_total{method=\"GET\",route=\"/\",status_code=\"200\"} 1"));
    }

    #[test]
    fn mismatched_labels_leave_state_untouched() {
        let c = requests();
        let err = c.inc(&[("method", "GET")]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::LabelMismatch);
        assert!(c.map.is_empty());
    }

    #[test]
    fn render_sorted_lines() {
        let c = requests();
        c.inc(&[("method", "POST"), ("route", "/a"), ("status_code", "200")])
            .unwrap();
        c.inc(&[("method", "GET"), ("route", "/b"), ("status_code", "404")])
            .unwrap();

        let mut out = String::new();
        c.render(&[], &mut out);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "# HELP http_requests_total Total number of HTTP requests");
        assert_eq!(lines[1], "# TYPE http_requests_total counter");
        assert_eq!(
            lines[2],
            "http_requests_total{method=\"GET\",route=\"/b\",status_code=\"404\"} 1"
        );
        assert_eq!(
            lines[3],
            "http_requests_total{method=\"POST\",route=\"/a\",status_code=\"200\"} 1"
        );
    }

    #[test]
    fn unlabelled_counter_renders_zero() {
        let c = Counter::new("boots_total", "Boots", LabelSchema::new(&[], &[]).unwrap());
        let mut out = String::new();
        c.render(&[], &mut out);
        assert!(out.ends_with("boots_total 0\n"));
    }
}
