//! Metrics registry: owns metric families and renders them.
//!
//! The registry is built explicitly at startup and shared via `Arc`. Metric
//! families keep their registration order in the output; within a family,
//! series are sorted by label values so repeated scrapes with no writes in
//! between are byte-identical.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::counter::Counter;
use crate::error::{ReqMeterError, Result};
use crate::exposition::{format_float, write_header, write_sample};
use crate::histogram::{validate_edges, Histogram};
use crate::labels::{check_metric_name, is_valid_label_name, LabelSchema};
use crate::process::Collector;

enum Family {
    Counter(Arc<Counter>),
    Histogram(Arc<Histogram>),
    Collector(Arc<dyn Collector>),
}

impl Family {
    fn names(&self) -> Vec<String> {
        match self {
            Family::Counter(c) => vec![c.name().to_string()],
            Family::Histogram(h) => vec![h.name().to_string()],
            Family::Collector(c) => c.names().into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Default)]
pub struct Registry {
    default_labels: Vec<(String, String)>,
    families: RwLock<Vec<Family>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose every exported series carries `labels`. `le` is
    /// reserved for histogram buckets and rejected here.
    pub fn with_default_labels<K, V>(labels: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut default_labels: Vec<(String, String)> = Vec::new();
        for (k, v) in labels {
            let k = k.into();
            let taken = k == "le" || default_labels.iter().any(|(dk, _)| *dk == k);
            if taken || !is_valid_label_name(&k) {
                return Err(ReqMeterError::InvalidLabelName(k));
            }
            default_labels.push((k, v.into()));
        }
        Ok(Self {
            default_labels,
            families: RwLock::new(Vec::new()),
        })
    }

    pub fn default_labels(&self) -> &[(String, String)] {
        &self.default_labels
    }

    pub fn register_counter(&self, name: &str, help: &str, label_keys: &[&str]) -> Result<Arc<Counter>> {
        check_metric_name(name)?;
        let schema = LabelSchema::new(label_keys, &[])?;
        let counter = Arc::new(Counter::new(name, help, schema));

        self.insert(&[name], Family::Counter(Arc::clone(&counter)))?;
        tracing::debug!(metric = %name, kind = "counter", "metric registered");
        Ok(counter)
    }

    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        label_keys: &[&str],
        bucket_edges: &[f64],
    ) -> Result<Arc<Histogram>> {
        check_metric_name(name)?;
        let schema = LabelSchema::new(label_keys, &["le"])?;
        validate_edges(bucket_edges)?;
        let histogram = Arc::new(Histogram::new(name, help, schema, bucket_edges.to_vec()));

        self.insert(&[name], Family::Histogram(Arc::clone(&histogram)))?;
        tracing::debug!(metric = %name, kind = "histogram", buckets = bucket_edges.len(), "metric registered");
        Ok(histogram)
    }

    pub fn register_collector(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let names = collector.names();
        for n in &names {
            check_metric_name(n)?;
        }
        self.insert(&names, Family::Collector(collector))?;
        tracing::debug!(metrics = names.len(), kind = "collector", "collector registered");
        Ok(())
    }

    /// Names of all registered metrics, in registration order.
    pub fn metric_names(&self) -> Vec<String> {
        self.read().iter().flat_map(Family::names).collect()
    }

    /// Render every family in Prometheus text exposition format.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for family in self.read().iter() {
            match family {
                Family::Counter(c) => c.render(&self.default_labels, &mut out),
                Family::Histogram(h) => h.render(&self.default_labels, &mut out),
                Family::Collector(c) => {
                    for s in c.collect() {
                        write_header(&mut out, s.name, s.help, "gauge");
                        write_sample(&mut out, s.name, &[], &self.default_labels, None, &format_float(s.value));
                    }
                }
            }
        }
        out
    }

    /// Duplicate check and insert happen under one write lock.
    fn insert(&self, names: &[&str], family: Family) -> Result<()> {
        let mut families = self.write();
        for (i, name) in names.iter().enumerate() {
            let taken = names[..i].contains(name)
                || families.iter().any(|f| f.names().iter().any(|n| n == name));
            if taken {
                return Err(ReqMeterError::DuplicateMetricName((*name).to_string()));
            }
        }
        families.push(family);
        Ok(())
    }

    // A poisoned lock only means a panic happened elsewhere mid-registration;
    // the family list itself is always left consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Family>> {
        self.families.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Family>> {
        self.families.write().unwrap_or_else(|p| p.into_inner())
    }
}
