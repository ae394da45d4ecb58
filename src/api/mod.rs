//! HTTP API for clipstream
//!
//! Explicit handler-per-route table; input validation happens at this
//! boundary, decoupled from the repository contract.

pub mod clips;
pub mod health;
pub mod stream;

use axum::http::Method;
use axum::response::Json;
use axum::routing::get;
use axum::{middleware, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{metrics, AppState};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(service_info))
        .route("/clips", get(clips::list_clips).post(clips::create_clip))
        .route("/clips/popular", get(clips::popular_clips))
        .route("/clips/:id", get(clips::get_clip))
        .route("/clips/:id/stream", get(stream::stream_clip))
        .route("/clips/:id/stats", get(clips::clip_stats))
        .route("/stats", get(clips::library_stats))
        .route("/metrics", get(metrics::metrics_handler))
        .merge(health::health_routes())
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET / - service information and endpoint map
async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "service": "clipstream",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Audio clip catalog and streaming service",
        "endpoints": {
            "health": "/health",
            "clips": "/clips",
            "popular": "/clips/popular",
            "stream": "/clips/{id}/stream",
            "stats": "/clips/{id}/stats",
            "library_stats": "/stats",
            "metrics": "/metrics"
        }
    }))
}
