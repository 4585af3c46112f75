//! HTTP API for the Roomframe service.
//!
//! This module provides the REST API endpoints for:
//! - Health monitoring
//! - Smart crop
//! - Camera framing
//! - Runtime settings

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::RoomframeService;

pub mod framing;
pub mod settings;
pub mod smart_crop;
use framing::framing_handler;
use settings::{get_settings_handler, update_settings_handler};
use smart_crop::smart_crop_handler;

/// Application state
pub struct AppState {
    pub service: Arc<RoomframeService>,
    pub start_time: Instant,
}

/// Build the API router
pub fn router(service: Arc<RoomframeService>) -> Router {
    // Images travel base64-encoded inside JSON bodies
    let max_body_size = service.runtime_config.static_config.limits.max_request_bytes;

    let state = Arc::new(AppState {
        service,
        start_time: Instant::now(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Image pipelines
        .route("/smart-crop", post(smart_crop_handler))
        .route("/framing", post(framing_handler))
        // Settings endpoints
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .layer(DefaultBodyLimit::max(max_body_size));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Health ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let vision_available = state.service.vision_available().await;

    let status = if vision_available {
        "healthy".to_string()
    } else {
        "degraded: vision backend unavailable".to_string()
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        vision_available,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    vision_available: bool,
}
