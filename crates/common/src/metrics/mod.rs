//! Metrics and observability utilities
//!
//! Registers metric descriptions and provides small recording helpers with
//! standardized naming. The recorder itself is installed by the binary.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all PaperScope metrics
pub const METRICS_PREFIX: &str = "paperscope";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_store_operations_total", METRICS_PREFIX),
        Unit::Count,
        "Paper store mutations by operation"
    );

    describe_counter!(
        format!("{}_fetches_total", METRICS_PREFIX),
        Unit::Count,
        "Document downloads by outcome"
    );

    describe_histogram!(
        format!("{}_summarization_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Summary generation latency in seconds"
    );

    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of retrieval queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Retrieval latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Count a store mutation (add, add_duplicate, delete, clear)
pub fn record_store_op(operation: &'static str) {
    counter!(
        format!("{}_store_operations_total", METRICS_PREFIX),
        "operation" => operation
    )
    .increment(1);
}

/// Count a document download attempt
pub fn record_fetch(success: bool) {
    let outcome = if success { "success" } else { "no_document" };
    counter!(
        format!("{}_fetches_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record summarization latency for a mode
pub fn record_summarization(duration_secs: f64, mode: &'static str, success: bool) {
    let status = if success { "success" } else { "error" };
    histogram!(
        format!("{}_summarization_duration_seconds", METRICS_PREFIX),
        "mode" => mode,
        "status" => status
    )
    .record(duration_secs);
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, mode: &'static str, result_count: usize) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "mode" => mode,
        "empty" => (result_count == 0).to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "mode" => mode
    )
    .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: every helper must be a no-op
        let metrics = RequestMetrics::start("GET", "/v1/papers");
        metrics.finish(200);
        record_store_op("add");
        record_fetch(false);
        record_summarization(0.01, "demo", true);
        record_search(0.002, "keyword", 0);
    }
}
