//! Cumulative histogram family.
//!
//! Each label-tuple owns one [`AtomicHistogram`]: a count per bucket edge, a
//! running sum (f64 stored as bits) and a total count. Buckets are cumulative
//! at write time, so rendering is a straight read.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::counter::pair;
use crate::error::{ReqMeterError, Result};
use crate::exposition::{format_float, write_header, write_sample};
use crate::labels::LabelSchema;

/// Bucket edges for request latency in seconds.
pub const DEFAULT_DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Edges must be non-empty, finite and strictly ascending.
pub fn validate_edges(edges: &[f64]) -> Result<()> {
    if edges.is_empty() {
        return Err(ReqMeterError::InvalidBucketEdges("no bucket edges".into()));
    }
    if let Some(e) = edges.iter().find(|e| !e.is_finite()) {
        return Err(ReqMeterError::InvalidBucketEdges(format!(
            "edge {e} is not finite"
        )));
    }
    if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
        return Err(ReqMeterError::InvalidBucketEdges(format!(
            "edges not strictly ascending at {} >= {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

#[derive(Debug)]
struct AtomicHistogram {
    count: AtomicU64,
    sum_bits: AtomicU64,
    buckets: Vec<AtomicU64>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_bits: AtomicU64::new(0f64.to_bits()),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn add_sum(&self, v: f64) {
        let _ = self
            .sum_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + v).to_bits())
            });
    }

    fn sum(&self) -> f64 {
        f64::from_bits(self.sum_bits.load(Ordering::Relaxed))
    }
}

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(edge, cumulative count)` per declared edge, ascending.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

#[derive(Debug)]
pub struct Histogram {
    name: String,
    help: String,
    schema: LabelSchema,
    edges: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl Histogram {
    pub(crate) fn new(name: &str, help: &str, schema: LabelSchema, edges: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            schema,
            edges,
            map: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Record one observation. Every bucket whose edge is >= `value` is
    /// incremented; values above the last edge only count toward `+Inf`.
    pub fn observe(&self, labels: &[(&str, &str)], value: f64) -> Result<()> {
        if value.is_nan() {
            return Err(ReqMeterError::InvalidObservation(format!(
                "{}: NaN observation",
                self.name
            )));
        }
        let key = self.schema.resolve(&self.name, labels)?;
        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(self.edges.len()));

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.add_sum(value);

        for (i, &edge) in self.edges.iter().enumerate() {
            if value <= edge {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Record a duration in seconds.
    pub fn observe_duration(&self, labels: &[(&str, &str)], duration: Duration) -> Result<()> {
        self.observe(labels, duration.as_secs_f64())
    }

    pub fn snapshot(&self, labels: &[(&str, &str)]) -> Result<Option<HistogramSnapshot>> {
        let key = self.schema.resolve(&self.name, labels)?;
        Ok(self.map.get(&key).map(|h| self.snapshot_of(h.value())))
    }

    fn snapshot_of(&self, hist: &AtomicHistogram) -> HistogramSnapshot {
        HistogramSnapshot {
            buckets: self
                .edges
                .iter()
                .zip(hist.buckets.iter())
                .map(|(&e, b)| (e, b.load(Ordering::Relaxed)))
                .collect(),
            sum: hist.sum(),
            count: hist.count.load(Ordering::Relaxed),
        }
    }

    /// Render in Prometheus text exposition format.
    pub(crate) fn render(&self, defaults: &[(String, String)], out: &mut String) {
        write_header(out, &self.name, &self.help, "histogram");

        let mut rows: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), self.snapshot_of(r.value())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        let bucket_name = format!("{}_bucket", self.name);
        let sum_name = format!("{}_sum", self.name);
        let count_name = format!("{}_count", self.name);

        for (values, snap) in &rows {
            let series = pair(self.schema.keys(), values);
            for (edge, n) in &snap.buckets {
                let le = format_float(*edge);
                write_sample(out, &bucket_name, &series, defaults, Some(("le", le.as_str())), &n.to_string());
            }
            let count = snap.count.to_string();
            write_sample(out, &bucket_name, &series, defaults, Some(("le", "+Inf")), &count);
            write_sample(out, &sum_name, &series, defaults, None, &format_float(snap.sum));
            write_sample(out, &count_name, &series, defaults, None, &count);
        }
    }
}
