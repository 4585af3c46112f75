use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod error;
mod framing;
mod image_data;
mod ollama;
mod service;
mod smart_crop;

use crate::config::RuntimeConfig;
use crate::service::RoomframeService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!("Starting Roomframe service v{}", env!("CARGO_PKG_VERSION"));

    // Load runtime config (static + dynamic from file and environment)
    let runtime_config = Arc::new(RuntimeConfig::load()?);
    info!(
        host = %runtime_config.static_config.server.host,
        port = runtime_config.static_config.server.port,
        max_request_bytes = runtime_config.static_config.limits.max_request_bytes,
        "Configuration loaded"
    );

    // Initialize the service
    let service = Arc::new(RoomframeService::new(runtime_config.clone())?);
    service.check_vision_backend().await;

    // Build the router
    let app = api::router(service);

    // Start the server
    let addr = format!(
        "{}:{}",
        runtime_config.static_config.server.host, runtime_config.static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roomframe_service=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
