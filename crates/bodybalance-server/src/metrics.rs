//! Prometheus metrics for the BodyBalance server.
//!
//! - HTTP request count and latency
//! - Content reads labelled by operation and data source
//! - Cache hit/miss counters and invalidation sweeps

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use bodybalance_core::DataSource;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

    pub const CONTENT_READS_TOTAL: &str = "content_reads_total";
    pub const CACHE_HITS_TOTAL: &str = "cache_hits_total";
    pub const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
    pub const CACHE_INVALIDATED_KEYS_TOTAL: &str = "cache_invalidated_keys_total";
}

/// Install the Prometheus recorder. Call once at startup; returns `false`
/// when a recorder is already installed.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        tracing::debug!("Prometheus metrics already initialized");
        return false;
    }

    // install_recorder() for pull-based metrics; /metrics is served by us.
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Failed to store Prometheus handle (already set)");
                return false;
            }
            tracing::info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Render all metrics in Prometheus text format. `None` when metrics were
/// never initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => path.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a successful content read and which tier served it.
pub fn record_content_read(operation: &'static str, source: DataSource) {
    counter!(
        names::CONTENT_READS_TOTAL,
        "operation" => operation,
        "source" => source.as_str(),
    )
    .increment(1);
    match source {
        DataSource::Cache => counter!(names::CACHE_HITS_TOTAL).increment(1),
        DataSource::Primary => counter!(names::CACHE_MISSES_TOTAL).increment(1),
    }
}

pub fn record_cache_invalidation(scope: &str, deleted: u64) {
    counter!(
        names::CACHE_INVALIDATED_KEYS_TOTAL,
        "scope" => scope.to_string(),
    )
    .increment(deleted);
}
