//! Prometheus text exposition helpers (format version 0.0.4).

use std::fmt::Write;

/// Content type for the `/metrics` response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Escape a label value.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Escape HELP text (quotes are legal there).
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a sample value or bucket edge.
///
/// Finite values use Rust's shortest round-trip formatting (`1`, `0.05`,
/// `2.5`); infinities render as `+Inf` / `-Inf`.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

pub(crate) fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Write one sample line.
///
/// Series labels come first, then default labels whose key is not already
/// present, then `extra` (used for `le`).
pub(crate) fn write_sample(
    out: &mut String,
    name: &str,
    series: &[(&str, &str)],
    defaults: &[(String, String)],
    extra: Option<(&str, &str)>,
    value: &str,
) {
    let mut parts: Vec<String> = Vec::with_capacity(series.len() + defaults.len() + 1);
    for (k, v) in series {
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }
    for (k, v) in defaults {
        if series.iter().any(|(sk, _)| *sk == k.as_str()) {
            continue;
        }
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }
    if let Some((k, v)) = extra {
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }

    if parts.is_empty() {
        let _ = writeln!(out, "{} {}", name, value);
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, parts.join(","), value);
    }
}
