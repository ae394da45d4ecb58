//! Prometheus metrics exposition
//!
//! Installs a process-wide recorder and renders its state at
//! GET /metrics for a pull-based scraper. Per-request counters and
//! latency histograms are recorded by the [`track_metrics`]
//! middleware; domain counters are recorded by the stream handler.

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Instant;

use crate::AppState;

static RECORDER_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder (idempotent) and return its handle
///
/// The recorder is process-global; repeated calls (one per AppState in
/// tests) share the same handle.
pub fn setup_metrics_recorder() -> PrometheusHandle {
    RECORDER_HANDLE
        .get_or_init(|| {
            const EXPONENTIAL_SECONDS: &[f64] = &[
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ];

            PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full("http_requests_duration_seconds".to_string()),
                    EXPONENTIAL_SECONDS,
                )
                .expect("histogram buckets are non-empty")
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// GET /metrics - render Prometheus exposition text
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Middleware recording request count and latency per route
///
/// Uses the matched route template (e.g. `/clips/:id/stream`) rather
/// than the raw path to keep label cardinality bounded.
pub async fn track_metrics(req: Request, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_requests_duration_seconds", &labels).record(latency);

    response
}

/// Record one served stream and publish the clip's stored play count
pub fn record_stream(clip_id: i64, play_count: i64) {
    let labels = [("clip_id", clip_id.to_string())];

    metrics::counter!("clip_streams_total", &labels).increment(1);
    metrics::gauge!("clip_play_count", &labels).set(play_count as f64);
}

/// Record a stream request that failed before delivery
pub fn record_stream_error(reason: &'static str) {
    let labels = [("reason", reason.to_string())];

    metrics::counter!("clip_stream_errors_total", &labels).increment(1);
}
