//! Prometheus metrics recording.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records one ingestion attempt. `source` is `vector` or `text`.
pub fn record_ingest(source: &'static str, outcome: &'static str) {
    counter!("uservec_ingest_total", "source" => source, "outcome" => outcome).increment(1);
}

/// Records one similarity query. `source` is `vector` or `text`.
pub fn record_query(source: &'static str, outcome: &'static str) {
    counter!("uservec_query_total", "source" => source, "outcome" => outcome).increment(1);
}

/// Updates the `uservec_vectors_total` gauge.
pub fn update_vector_count(count: usize) {
    gauge!("uservec_vectors_total").set(count as f64);
}

/// Outcome label for a handler result.
pub fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}
