#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::thread;

use reqmeter_core::{Registry, DEFAULT_DURATION_BUCKETS};

const THREADS: u64 = 8;
const PER_THREAD: u64 = 1_000;

#[test]
fn concurrent_increments_sum_exactly() {
    let registry = Registry::new();
    let counter = registry
        .register_counter("hits_total", "Hits", &["route"])
        .unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let counter = &counter;
            s.spawn(move || {
                for _ in 0..PER_THREAD {
                    counter.add(&[("route", "/shared")], t + 1).unwrap();
                }
            });
        }
    });

    let expected: u64 = (1..=THREADS).map(|t| t * PER_THREAD).sum();
    assert_eq!(counter.value(&[("route", "/shared")]).unwrap(), Some(expected));
}

#[test]
fn concurrent_observations_keep_histogram_consistent() {
    let registry = Registry::new();
    let histogram = registry
        .register_histogram("latency_seconds", "Latency", &["route"], &DEFAULT_DURATION_BUCKETS)
        .unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            let histogram = &histogram;
            s.spawn(move || {
                for _ in 0..PER_THREAD {
                    histogram.observe(&[("route", "/")], 0.5).unwrap();
                }
            });
        }
    });

    let snap = histogram.snapshot(&[("route", "/")]).unwrap().unwrap();
    let total = THREADS * PER_THREAD;
    assert_eq!(snap.count, total);
    assert!((snap.sum - 0.5 * total as f64).abs() < 1e-6);
    for (edge, n) in &snap.buckets {
        assert_eq!(*n, if *edge >= 0.5 { total } else { 0 }, "bucket {edge}");
    }
}
