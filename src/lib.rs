//! # clipstream
//!
//! Audio clip catalog and streaming service:
//! - Clip metadata CRUD over a SQLite store
//! - Stream delivery (redirect to upstream URLs, chunked local files)
//! - Atomic per-clip play counters, correct under concurrent requests
//! - Prometheus metrics exposition for a pull-based scraper

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;

pub use api::build_router;
pub use error::{Error, Result};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::SqlitePool;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Prometheus recorder handle for /metrics rendering
    pub metrics: PrometheusHandle,
    /// Startup timestamp for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            metrics: metrics::setup_metrics_recorder(),
            started_at: Utc::now(),
        }
    }
}
