//! Process-level gauges sampled at scrape time.
//!
//! Memory and file-descriptor readings come from `/proc/self` and are simply
//! omitted on platforms without it.

use std::fs;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// One gauge reading produced by a [`Collector`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSample {
    pub name: &'static str,
    pub help: &'static str,
    pub value: f64,
}

/// A source of gauge samples read during serialization.
pub trait Collector: Send + Sync {
    /// Every metric name this collector may emit. Checked for uniqueness at
    /// registration.
    fn names(&self) -> Vec<&'static str>;

    /// Sample current values.
    fn collect(&self) -> Vec<GaugeSample>;
}

pub const PROCESS_START_TIME: &str = "process_start_time_seconds";
pub const PROCESS_UPTIME: &str = "process_uptime_seconds";
pub const PROCESS_RESIDENT_MEMORY: &str = "process_resident_memory_bytes";
pub const PROCESS_VIRTUAL_MEMORY: &str = "process_virtual_memory_bytes";
pub const PROCESS_OPEN_FDS: &str = "process_open_fds";

#[derive(Debug)]
pub struct ProcessCollector {
    started_unix: f64,
    started: Instant,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    pub fn new() -> Self {
        let started_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        Self {
            started_unix,
            started: Instant::now(),
        }
    }
}

impl Collector for ProcessCollector {
    fn names(&self) -> Vec<&'static str> {
        vec![
            PROCESS_START_TIME,
            PROCESS_UPTIME,
            PROCESS_RESIDENT_MEMORY,
            PROCESS_VIRTUAL_MEMORY,
            PROCESS_OPEN_FDS,
        ]
    }

    fn collect(&self) -> Vec<GaugeSample> {
        let mut out = vec![
            GaugeSample {
                name: PROCESS_START_TIME,
                help: "Start time of the process since unix epoch in seconds.",
                value: self.started_unix.floor(),
            },
            GaugeSample {
                name: PROCESS_UPTIME,
                help: "Seconds since the process started.",
                value: self.started.elapsed().as_secs_f64(),
            },
        ];

        if let Some((vm_size, vm_rss)) = read_status_memory() {
            out.push(GaugeSample {
                name: PROCESS_RESIDENT_MEMORY,
                help: "Resident memory size in bytes.",
                value: vm_rss as f64,
            });
            out.push(GaugeSample {
                name: PROCESS_VIRTUAL_MEMORY,
                help: "Virtual memory size in bytes.",
                value: vm_size as f64,
            });
        }

        if let Ok(dir) = fs::read_dir("/proc/self/fd") {
            out.push(GaugeSample {
                name: PROCESS_OPEN_FDS,
                help: "Number of open file descriptors.",
                value: dir.count() as f64,
            });
        }

        out
    }
}

/// `(VmSize, VmRSS)` in bytes from `/proc/self/status`.
fn read_status_memory() -> Option<(u64, u64)> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    parse_status_memory(&status)
}

fn parse_status_memory(status: &str) -> Option<(u64, u64)> {
    let mut size = None;
    let mut rss = None;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmSize:") {
            size = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("VmRSS:") {
            rss = parse_kb(rest);
        }
    }
    Some((size?, rss?))
}

fn parse_kb(field: &str) -> Option<u64> {
    let kb: u64 = field.split_whitespace().next()?.parse().ok()?;
    Some(kb * 1024)
}
