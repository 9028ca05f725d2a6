//! Prometheus metrics

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;
use crate::domain::crag::{
    METRIC_GENERATION_FALLBACKS, METRIC_GRADING_FAILURES, METRIC_RETRIEVAL_FAILURES,
    METRIC_REWRITES, METRIC_REWRITE_FALLBACKS, METRIC_RUNS, METRIC_RUN_DURATION,
};

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder. `None` when disabled or already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_metrics();

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn describe_metrics() {
    describe_counter!(METRIC_RUNS, "Completed CRAG runs by terminal step");
    describe_counter!(METRIC_REWRITES, "Query rewrites performed");
    describe_counter!(
        METRIC_GRADING_FAILURES,
        "Grader calls that failed and were treated as relevant"
    );
    describe_counter!(
        METRIC_GENERATION_FALLBACKS,
        "Generations replaced by the fallback answer"
    );
    describe_counter!(
        METRIC_REWRITE_FALLBACKS,
        "Rewrites replaced by the original query"
    );
    describe_counter!(METRIC_RETRIEVAL_FAILURES, "Retrievals that ended a run");
    describe_histogram!(
        METRIC_RUN_DURATION,
        Unit::Seconds,
        "End-to-end CRAG run duration"
    );

    gauge!("legal_crag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Router serving the Prometheus text exposition at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_return_none() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };

        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("POST", "/v1/ask", 200, Duration::from_millis(12));
    }
}
