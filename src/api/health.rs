//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{db, AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok" when the store answers)
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Store connectivity ("connected")
    pub database: String,
    /// Library totals
    pub stats: HealthStats,
}

#[derive(Debug, Serialize)]
pub struct HealthStats {
    pub total_clips: i64,
    pub total_plays: i64,
}

/// GET /health
///
/// Liveness plus store connectivity: the library totals double as the
/// connection probe. Store failures answer 503.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    match db::clips::library_stats(&state.db).await {
        Ok(stats) => Json(HealthResponse {
            status: "ok".to_string(),
            service: "clipstream".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds,
            database: "connected".to_string(),
            stats: HealthStats {
                total_clips: stats.total_clips,
                total_plays: stats.total_plays,
            },
        })
        .into_response(),
        Err(err) => {
            error!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "clipstream",
                    "database": "connection_failed",
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
